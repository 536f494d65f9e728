//! Two-instrument spread backtests.

use backtest_core::error::BacktestError;
use backtest_core::types::{
    to_decimal, Bar, BarSeries, EquityPoint, PairBacktestResult, PairPosition, PairTrade,
    SpreadDirection,
};
use backtest_strategies::{PairAction, PairTradingStrategy};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::engine::BacktestConfig;
use crate::ledger::RejectReason;

/// Bars of two series that share a timestamp, in order.
#[derive(Debug, Clone, Default)]
pub struct AlignedPair {
    pub a: Vec<Bar>,
    pub b: Vec<Bar>,
    /// Bars dropped from either side
    pub unmatched: usize,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Intersect two ordered series on their timestamps.
pub fn align(a: &[Bar], b: &[Bar]) -> AlignedPair {
    let mut aligned = AlignedPair::default();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (ta, tb) = (a[i].timestamp, b[j].timestamp);
        if ta == tb {
            aligned.a.push(a[i]);
            aligned.b.push(b[j]);
            i += 1;
            j += 1;
        } else if ta < tb {
            i += 1;
        } else {
            j += 1;
        }
    }

    aligned.unmatched = (a.len() - aligned.a.len()) + (b.len() - aligned.b.len());
    aligned
}

/// Cash and spread position for one pair run.
#[derive(Debug)]
struct PairLedger {
    cash: Decimal,
    position: Option<PairPosition>,
    total_profit: Decimal,
    trades: Vec<PairTrade>,
}

impl PairLedger {
    fn new(cash: Decimal) -> Self {
        Self {
            cash,
            position: None,
            total_profit: Decimal::ZERO,
            trades: Vec::new(),
        }
    }

    fn market_value(&self, price_a: Decimal, price_b: Decimal) -> Decimal {
        self.position
            .as_ref()
            .map(|p| p.market_value(price_a, price_b))
            .unwrap_or(Decimal::ZERO)
    }

    /// Buy one leg and short the other. Cash must cover the long leg; short
    /// proceeds are credited.
    #[allow(clippy::too_many_arguments)]
    fn open(
        &mut self,
        direction: SpreadDirection,
        units_a: Decimal,
        units_b: Decimal,
        price_a: Decimal,
        price_b: Decimal,
        timestamp: i64,
        zscore: f64,
    ) -> Result<(), RejectReason> {
        if self.position.is_some() {
            return Err(RejectReason::PositionLimit);
        }
        if units_a <= Decimal::ZERO || units_b <= Decimal::ZERO {
            return Err(RejectReason::InvalidOrder);
        }
        let position = PairPosition {
            direction,
            leg_a_size: direction.sign_a() * units_a,
            leg_b_size: direction.sign_b() * units_b,
            entry_a: price_a,
            entry_b: price_b,
            entry_timestamp: timestamp,
        };
        if position.long_leg_cost() > self.cash {
            return Err(RejectReason::InsufficientFunds);
        }

        self.cash -= position.market_value(price_a, price_b);
        self.trades.push(PairTrade {
            timestamp,
            opening: true,
            price_a,
            price_b,
            size_a: position.leg_a_size,
            size_b: position.leg_b_size,
            zscore,
            profit: None,
        });
        self.position = Some(position);
        Ok(())
    }

    fn close(
        &mut self,
        price_a: Decimal,
        price_b: Decimal,
        timestamp: i64,
        zscore: f64,
    ) -> Result<Decimal, RejectReason> {
        let position = self.position.take().ok_or(RejectReason::NoPosition)?;
        let profit = position.exit_profit(price_a, price_b);

        self.cash += position.market_value(price_a, price_b);
        self.total_profit += profit;
        self.trades.push(PairTrade {
            timestamp,
            opening: false,
            price_a,
            price_b,
            size_a: -position.leg_a_size,
            size_b: -position.leg_b_size,
            zscore,
            profit: Some(profit),
        });
        Ok(profit)
    }
}

/// Backtest engine for [`PairTradingStrategy`].
///
/// Entering a spread needs cash for the long leg only; the short leg's
/// proceeds are credited. Closing a losing spread therefore can leave cash
/// below zero, which the result reports as `min_cash`.
#[derive(Debug, Clone, Default)]
pub struct PairBacktestEngine {
    config: BacktestConfig,
}

impl PairBacktestEngine {
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run `strategy` over the bars `a` and `b` have in common.
    pub fn run(
        &self,
        strategy: &mut PairTradingStrategy,
        a: &BarSeries,
        b: &BarSeries,
    ) -> PairBacktestResult {
        let initial_cash = self.config.initial_cash;
        let aligned = align(a.bars(), b.bars());
        if aligned.unmatched > 0 {
            debug!(
                unmatched = aligned.unmatched,
                "Dropped bars without a matching timestamp"
            );
        }

        let closes_a: Vec<f64> = aligned.a.iter().map(|bar| bar.close).collect();
        let closes_b: Vec<f64> = aligned.b.iter().map(|bar| bar.close).collect();
        strategy.compute(&closes_a, &closes_b);

        info!(
            strategy = strategy.name(),
            symbol_a = %a.symbol,
            symbol_b = %b.symbol,
            bars = aligned.len(),
            "Starting pair backtest"
        );

        let mut ledger = PairLedger::new(initial_cash);
        let mut equity_curve = Vec::with_capacity(aligned.len());
        let mut rejected_signals = 0;
        let mut min_cash = initial_cash;
        let (mut mark_a, mut mark_b) = (Decimal::ZERO, Decimal::ZERO);

        for (index, (bar_a, bar_b)) in aligned.a.iter().zip(&aligned.b).enumerate() {
            let prices = to_decimal(bar_a.close).zip(to_decimal(bar_b.close));
            if let Some((price_a, price_b)) = prices {
                mark_a = price_a;
                mark_b = price_b;
            }

            let held = ledger.position.as_ref().map(|p| p.direction);
            if let (Some(signal), Some((price_a, price_b))) = (strategy.on_bar(index, held), prices)
            {
                let outcome = match signal.action {
                    PairAction::Enter(direction) => {
                        let config = strategy.config();
                        ledger.open(
                            direction,
                            config.leg_size(price_a),
                            config.leg_size(price_b),
                            price_a,
                            price_b,
                            bar_a.timestamp,
                            signal.zscore,
                        )
                    }
                    PairAction::Exit => ledger
                        .close(price_a, price_b, bar_a.timestamp, signal.zscore)
                        .map(|_| ()),
                };
                match outcome {
                    Ok(()) => debug!(
                        bar = index,
                        action = ?signal.action,
                        zscore = signal.zscore,
                        cash = %ledger.cash,
                        "Pair trade executed"
                    ),
                    Err(reason) => {
                        rejected_signals += 1;
                        debug!(bar = index, action = ?signal.action, %reason, "Pair signal rejected");
                    }
                }
            }

            min_cash = min_cash.min(ledger.cash);
            equity_curve.push(EquityPoint::new(
                bar_a.timestamp,
                ledger.cash,
                ledger.market_value(mark_a, mark_b),
            ));
        }

        let result = PairBacktestResult {
            strategy: strategy.name().to_string(),
            symbol_a: a.symbol.clone(),
            symbol_b: b.symbol.clone(),
            initial_cash,
            final_cash: ledger.cash,
            num_trades: ledger.trades.len(),
            trades: ledger.trades,
            equity_curve,
            total_profit: ledger.total_profit,
            final_position: ledger.position,
            rejected_signals,
            unmatched_bars: aligned.unmatched,
            min_cash,
        };

        info!(
            trades = result.num_trades,
            total_profit = %result.total_profit,
            final_equity = %result.final_equity(),
            "Pair backtest complete"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backtest_core::Timeframe;
    use backtest_strategies::PairTradingConfig;
    use rust_decimal_macros::dec;

    fn series(symbol: &str, timestamps: &[i64], closes: &[f64]) -> BarSeries {
        let bars = timestamps
            .iter()
            .zip(closes)
            .map(|(&ts, &close)| Bar::flat(ts, close))
            .collect();
        BarSeries::from_bars(symbol, Timeframe::Daily, bars).unwrap()
    }

    fn strategy(notional: Decimal) -> PairTradingStrategy {
        PairTradingStrategy::new(PairTradingConfig {
            lookback: 5,
            entry_z: 1.5,
            exit_z: 0.5,
            notional,
            ..Default::default()
        })
    }

    #[test]
    fn test_align_drops_unmatched() {
        let a = series("A", &[1, 2, 3, 5], &[1.0; 4]);
        let b = series("B", &[2, 3, 4, 5, 6], &[2.0; 5]);
        let aligned = align(a.bars(), b.bars());

        let timestamps: Vec<i64> = aligned.a.iter().map(|bar| bar.timestamp).collect();
        assert_eq!(timestamps, vec![2, 3, 5]);
        assert_eq!(aligned.b.len(), 3);
        assert_eq!(aligned.unmatched, 3);
    }

    #[test]
    fn test_long_spread_round_trip() {
        let ts: Vec<i64> = (0..9).collect();
        let a = series(
            "A",
            &ts,
            &[100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 90.0, 95.0, 97.0],
        );
        let b = series("B", &ts, &[100.0; 9]);

        let engine = PairBacktestEngine::new(BacktestConfig {
            initial_cash: dec!(10000),
        })
        .unwrap();
        let result = engine.run(&mut strategy(dec!(900)), &a, &b);

        assert_eq!(result.num_trades, 2);
        let entry = &result.trades[0];
        assert!(entry.opening);
        // 900 / 90 = 10 units of A long, 900 / 100 = 9 units of B short
        assert_eq!(entry.size_a, dec!(10));
        assert_eq!(entry.size_b, dec!(-9));

        // A: (97 - 90) * 10 = 70, B flat
        assert_eq!(result.total_profit, dec!(70));
        assert_eq!(result.trades[1].profit, Some(dec!(70)));
        assert_eq!(result.final_cash, dec!(10070));
        assert_eq!(result.min_cash, dec!(10000));
        assert!(result.final_position.is_none());
        assert_eq!(result.equity_curve.len(), 9);
        // Equity on the entry bar equals the cash before entry
        assert_eq!(result.equity_curve[6].equity, dec!(10000));
    }

    #[test]
    fn test_insufficient_cash_for_long_leg() {
        let ts: Vec<i64> = (0..9).collect();
        let a = series(
            "A",
            &ts,
            &[100.0, 101.0, 100.0, 101.0, 100.0, 101.0, 90.0, 95.0, 97.0],
        );
        let b = series("B", &ts, &[100.0; 9]);

        let engine = PairBacktestEngine::new(BacktestConfig {
            initial_cash: dec!(100),
        })
        .unwrap();
        let result = engine.run(&mut strategy(dec!(900)), &a, &b);

        assert_eq!(result.num_trades, 0);
        assert!(result.rejected_signals > 0);
        assert_eq!(result.final_cash, dec!(100));
    }

    #[test]
    fn test_identical_legs_no_trades() {
        let ts: Vec<i64> = (0..30).collect();
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + (i as f64 * 0.4).cos() * 3.0).collect();
        let a = series("A", &ts, &closes);
        let b = series("B", &ts, &closes);

        let result = PairBacktestEngine::default().run(&mut strategy(dec!(1000)), &a, &b);

        assert_eq!(result.num_trades, 0);
        assert_eq!(result.total_profit, Decimal::ZERO);
        assert!(result
            .equity_curve
            .iter()
            .all(|p| p.equity == result.initial_cash));
    }
}
