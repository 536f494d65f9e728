//! Backtest report generation.

use std::fmt::Write;

use backtest_core::types::{BacktestResult, EquityPoint, PairBacktestResult, Timeframe};
use serde::{Deserialize, Serialize};

use crate::BacktestStats;

const RULE: &str = "═══════════════════════════════════════════════════════════\n";
const SECTION: &str = "───────────────────────────────────────────────────────────\n";

/// Complete single-instrument backtest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Statistics
    pub stats: BacktestStats,
    /// Raw result with trades and equity curve
    pub result: BacktestResult,
}

impl BacktestReport {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, result: BacktestResult) -> Self {
        let stats = BacktestStats::from_result(&result, timeframe.periods_per_year());
        Self {
            symbol: symbol.into(),
            timeframe,
            stats,
            result,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = header(&format!(
            "{} on {} ({})",
            self.result.strategy, self.symbol, self.timeframe
        ));
        write_stats(&mut s, &self.stats);

        if let Some(position) = &self.result.final_position {
            s.push_str("OPEN POSITION\n");
            s.push_str(SECTION);
            let _ = writeln!(s, "  Size:                {}", position.size);
            let _ = writeln!(s, "  Entry Price:         ${:.2}", position.entry_price);
            let _ = writeln!(s, "  Entries:             {}", position.entries);
            s.push('\n');
        }

        s.push_str(RULE);
        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV (equity curve only).
    pub fn equity_to_csv(&self) -> String {
        equity_csv(&self.result.equity_curve)
    }
}

/// Complete pair backtest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairBacktestReport {
    pub timeframe: Timeframe,
    pub stats: BacktestStats,
    pub result: PairBacktestResult,
}

impl PairBacktestReport {
    pub fn new(timeframe: Timeframe, result: PairBacktestResult) -> Self {
        let stats = BacktestStats::from_pair_result(&result, timeframe.periods_per_year());
        Self {
            timeframe,
            stats,
            result,
        }
    }

    pub fn summary(&self) -> String {
        let mut s = header(&format!(
            "{} on {}/{} ({})",
            self.result.strategy, self.result.symbol_a, self.result.symbol_b, self.timeframe
        ));
        write_stats(&mut s, &self.stats);

        s.push_str("PAIR\n");
        s.push_str(SECTION);
        let _ = writeln!(s, "  Unmatched Bars:      {}", self.result.unmatched_bars);
        let _ = writeln!(s, "  Lowest Cash:         ${:.2}", self.result.min_cash);
        if let Some(position) = &self.result.final_position {
            let _ = writeln!(
                s,
                "  Open Spread:         {:?} ({} / {})",
                position.direction, position.leg_a_size, position.leg_b_size
            );
        }
        s.push('\n');

        s.push_str(RULE);
        s
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn equity_to_csv(&self) -> String {
        equity_csv(&self.result.equity_curve)
    }
}

fn header(title: &str) -> String {
    let mut s = String::new();
    s.push_str(RULE);
    s.push_str("                     BACKTEST REPORT                        \n");
    let _ = writeln!(s, "  {}", title);
    s.push_str(RULE);
    s.push('\n');
    s
}

fn write_stats(s: &mut String, stats: &BacktestStats) {
    s.push_str("PERFORMANCE\n");
    s.push_str(SECTION);
    let _ = writeln!(s, "  Initial Cash:        ${:.2}", stats.initial_cash);
    let _ = writeln!(s, "  Final Equity:        ${:.2}", stats.final_equity);
    let _ = writeln!(s, "  Realized Profit:     ${:.2}", stats.total_profit);
    let _ = writeln!(s, "  Total Return:        {:.2}%", stats.total_return_pct);
    let _ = writeln!(s, "  Max Drawdown:        {:.2}%", stats.max_drawdown_pct);
    let _ = writeln!(s, "  Sharpe Ratio:        {:.2}", stats.sharpe_ratio);
    let _ = writeln!(s, "  Profit Factor:       {:.2}", stats.profit_factor);
    s.push('\n');

    s.push_str("TRADE STATISTICS\n");
    s.push_str(SECTION);
    let _ = writeln!(s, "  Total Trades:        {}", stats.total_trades);
    let _ = writeln!(s, "  Closed Trades:       {}", stats.closed_trades);
    let _ = writeln!(s, "  Winning Trades:      {}", stats.winning_trades);
    let _ = writeln!(s, "  Losing Trades:       {}", stats.losing_trades);
    let _ = writeln!(s, "  Win Rate:            {:.2}%", stats.win_rate_pct);
    let _ = writeln!(s, "  Bars Processed:      {}", stats.bars_processed);
    let _ = writeln!(s, "  Rejected Signals:    {}", stats.rejected_signals);
    s.push('\n');
}

fn equity_csv(curve: &[EquityPoint]) -> String {
    let mut csv = String::from("timestamp,cash,position_value,equity\n");
    for point in curve {
        let _ = writeln!(
            csv,
            "{},{},{},{}",
            point.timestamp, point.cash, point.position_value, point.equity
        );
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_result() -> BacktestResult {
        let mut result = BacktestResult::empty("MA Crossover", dec!(100000));
        result.equity_curve = vec![
            EquityPoint::new(0, dec!(100000), dec!(0)),
            EquityPoint::new(1, dec!(90000), dec!(20000)),
        ];
        result
    }

    #[test]
    fn test_report_summary() {
        let report = BacktestReport::new("TEST", Timeframe::Daily, sample_result());

        let summary = report.summary();
        assert!(summary.contains("MA Crossover on TEST (1d)"));
        assert!(summary.contains("Total Return"));
        assert!(summary.contains("10.00%"));
    }

    #[test]
    fn test_equity_csv() {
        let report = BacktestReport::new("TEST", Timeframe::Daily, sample_result());
        let csv = report.equity_to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "timestamp,cash,position_value,equity");
        assert_eq!(lines[2], "1,90000,20000,110000");
    }

    #[test]
    fn test_json_roundtrip_fields() {
        let report = BacktestReport::new("TEST", Timeframe::Daily, sample_result());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["symbol"], "TEST");
        assert_eq!(json["result"]["strategy"], "MA Crossover");
        assert_eq!(json["stats"]["bars_processed"], 2);
    }
}
