//! Benchmarks for indicator implementations.

use backtest_core::traits::{Indicator, MultiOutputIndicator, OhlcvIndicator};
use backtest_indicators::{BollingerBands, Ema, Kdj, Macd, Rsi, Sma, ZScore};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn benchmark_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("MovingAverage");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("sma", size), &data, |b, data| {
            let sma = Sma::new(20);
            b.iter(|| sma.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("ema", size), &data, |b, data| {
            let ema = Ema::new(20);
            b.iter(|| ema.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_momentum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Momentum");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);
        let high: Vec<f64> = data.iter().map(|v| v + 1.0).collect();
        let low: Vec<f64> = data.iter().map(|v| v - 1.0).collect();

        group.bench_with_input(BenchmarkId::new("rsi", size), &data, |b, data| {
            let rsi = Rsi::new(14);
            b.iter(|| rsi.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("macd", size), &data, |b, data| {
            let macd = Macd::new();
            b.iter(|| macd.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("kdj", size), &data, |b, data| {
            let kdj = Kdj::new();
            b.iter(|| kdj.calculate(black_box(&high), black_box(&low), black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_volatility(c: &mut Criterion) {
    let mut group = c.benchmark_group("Volatility");

    for size in [1000, 10000, 100000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("bollinger", size), &data, |b, data| {
            let bands = BollingerBands::new();
            b.iter(|| bands.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("zscore", size), &data, |b, data| {
            let zscore = ZScore::new(20);
            b.iter(|| zscore.calculate(black_box(data)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_moving_averages,
    benchmark_momentum,
    benchmark_volatility
);
criterion_main!(benches);
