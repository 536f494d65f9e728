use backtest_core::types::{Bar, BarSeries, Timeframe, TradeSide};
use backtest_engine::{BacktestConfig, BacktestEngine, PairBacktestEngine};
use backtest_strategies::{PairTradingConfig, PairTradingStrategy, StrategyRegistry};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

fn series(returns: &[f64]) -> BarSeries {
    let mut close = 100.0;
    let bars = returns
        .iter()
        .enumerate()
        .map(|(i, r)| {
            close *= 1.0 + r;
            Bar::new(i as i64 * 60_000, close, close * 1.01, close * 0.99, close, 1.0)
        })
        .collect();
    BarSeries::from_bars("PROP", Timeframe::Minute1, bars).unwrap()
}

fn strategy_params() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        ("ma_crossover", json!({ "fast_period": 3, "slow_period": 8 })),
        ("macd_crossover", json!({ "fast_period": 3, "slow_period": 6, "signal_period": 3 })),
        ("kdj", json!({ "period": 5 })),
        ("rsi", json!({ "period": 5 })),
        ("bollinger", json!({ "period": 10, "std_dev": 1.5 })),
        ("macd_kdj", json!({ "fast_period": 3, "slow_period": 6, "signal_period": 3, "kdj_period": 5 })),
        ("mean_reversion", json!({ "lookback": 10, "entry_z": 1.5 })),
        ("turtle", json!({ "entry_period": 10, "exit_period": 5, "atr_period": 5 })),
        ("volatility_breakout", json!({ "atr_period": 5, "k": 0.5, "exit_period": 5 })),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn ledger_invariants_hold_for_every_strategy(
        returns in prop::collection::vec(-0.05f64..0.05, 30..150),
        cash in 500u32..50_000,
    ) {
        let series = series(&returns);
        let registry = StrategyRegistry::new();
        let engine = BacktestEngine::new(BacktestConfig { initial_cash: Decimal::from(cash) }).unwrap();

        for (name, params) in strategy_params() {
            let mut strategy = registry.create(name, params).unwrap();
            let result = engine.run(&mut strategy, &series);

            prop_assert_eq!(result.equity_curve.len(), series.len());
            prop_assert_eq!(result.num_trades, result.trades.len());
            for point in &result.equity_curve {
                prop_assert!(point.cash >= Decimal::ZERO, "{} went negative", name);
                prop_assert_eq!(point.equity, point.cash + point.position_value);
            }

            let mut held = Decimal::ZERO;
            let mut realized = Decimal::ZERO;
            for trade in &result.trades {
                prop_assert_eq!(trade.value, trade.price * trade.size);
                match trade.side {
                    TradeSide::Buy => {
                        held += trade.size;
                        prop_assert!(trade.profit.is_none());
                    }
                    TradeSide::Sell => {
                        prop_assert!(trade.size <= held);
                        held -= trade.size;
                        realized += trade.profit.unwrap_or_default();
                    }
                }
                prop_assert_eq!(trade.resulting_position, held);
            }
            prop_assert_eq!(realized, result.total_profit);

            let open = result.final_position.as_ref().map(|p| p.size).unwrap_or_default();
            prop_assert_eq!(open, held);
        }
    }

    #[test]
    fn pair_equity_tracks_cash_and_legs(
        returns_a in prop::collection::vec(-0.03f64..0.03, 40..120),
        returns_b in prop::collection::vec(-0.03f64..0.03, 40..120),
    ) {
        let a = series(&returns_a);
        let b = series(&returns_b);
        let mut strategy = PairTradingStrategy::new(PairTradingConfig {
            lookback: 10,
            entry_z: 1.5,
            exit_z: 0.3,
            ..Default::default()
        });

        let result = PairBacktestEngine::new(BacktestConfig {
            initial_cash: Decimal::from(100_000),
        })
        .unwrap()
        .run(&mut strategy, &a, &b);

        prop_assert_eq!(result.equity_curve.len(), a.len().min(b.len()));
        prop_assert_eq!(result.unmatched_bars, a.len().max(b.len()) - a.len().min(b.len()));

        prop_assert!(result.min_cash <= result.initial_cash);
        for point in &result.equity_curve {
            prop_assert!(result.min_cash <= point.cash);
        }

        let realized: Decimal = result.trades.iter().filter_map(|t| t.profit).sum();
        prop_assert_eq!(realized, result.total_profit);
        if result.final_position.is_none() {
            prop_assert_eq!(result.final_cash, result.initial_cash + result.total_profit);
        }
        for pair in result.trades.windows(2) {
            prop_assert_ne!(pair[0].opening, pair[1].opening);
        }
    }
}
