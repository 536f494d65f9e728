//! Position types for single-asset and pair backtests.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Signal, SignalKind};

/// Convert a bar price into a ledger amount.
///
/// Returns `None` for NaN, infinite or out-of-range values.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok()
}

/// Convert a ledger amount back to f64 for statistics and indicator math.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// An open long position in a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Units held (always positive while open)
    pub size: Decimal,
    /// Size-weighted average entry price
    pub entry_price: Decimal,
    /// Timestamp of the first entry
    pub entry_timestamp: i64,
    /// Number of entries stacked into this position
    pub entries: u32,
    /// Price of the most recent entry
    pub last_entry_price: Decimal,
}

impl Position {
    /// Open a new position.
    pub fn open(size: Decimal, price: Decimal, timestamp: i64) -> Self {
        Self {
            size,
            entry_price: price,
            entry_timestamp: timestamp,
            entries: 1,
            last_entry_price: price,
        }
    }

    /// Stack another entry on top of the position.
    pub fn add(&mut self, size: Decimal, price: Decimal) {
        let total = self.size + size;
        if total > Decimal::ZERO {
            self.entry_price = (self.entry_price * self.size + price * size) / total;
        }
        self.size = total;
        self.entries += 1;
        self.last_entry_price = price;
    }

    /// Market value at `price`.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.size * price
    }

    /// Unrealized profit at `price`.
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        (price - self.entry_price) * self.size
    }

    /// Read-only view handed to signal generators.
    pub fn view(&self) -> PositionView {
        PositionView {
            entries: self.entries,
            last_entry_price: Some(to_f64(self.last_entry_price)),
        }
    }
}

/// What a signal generator may know about the current position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    /// Entries currently stacked (0 when flat)
    pub entries: u32,
    /// Price of the most recent entry
    pub last_entry_price: Option<f64>,
}

impl PositionView {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.entries == 0
    }

    pub fn is_long(&self) -> bool {
        self.entries > 0
    }

    /// Update the view as if `signal` had been filled in full.
    ///
    /// Buys beyond `max_entries` and sells while flat leave the view unchanged,
    /// matching what the ledger would do with them.
    pub fn apply(&mut self, signal: &Signal, max_entries: u32) {
        match signal.kind {
            SignalKind::Buy if self.entries < max_entries => {
                self.entries += 1;
                self.last_entry_price = Some(signal.price);
            }
            SignalKind::Sell if self.is_long() => *self = Self::flat(),
            _ => {}
        }
    }
}

/// Which side of the spread a pair position holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadDirection {
    /// Long leg A, short leg B
    Long,
    /// Short leg A, long leg B
    Short,
}

impl SpreadDirection {
    /// Sign of leg A's holding.
    pub fn sign_a(&self) -> Decimal {
        match self {
            SpreadDirection::Long => Decimal::ONE,
            SpreadDirection::Short => Decimal::NEGATIVE_ONE,
        }
    }

    /// Sign of leg B's holding.
    pub fn sign_b(&self) -> Decimal {
        -self.sign_a()
    }
}

/// An open two-leg spread position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPosition {
    pub direction: SpreadDirection,
    /// Signed units of leg A (positive when long)
    pub leg_a_size: Decimal,
    /// Signed units of leg B (opposite sign to leg A)
    pub leg_b_size: Decimal,
    pub entry_a: Decimal,
    pub entry_b: Decimal,
    pub entry_timestamp: i64,
}

impl PairPosition {
    /// Signed market value of both legs.
    pub fn market_value(&self, price_a: Decimal, price_b: Decimal) -> Decimal {
        self.leg_a_size * price_a + self.leg_b_size * price_b
    }

    /// Profit from closing both legs at the given prices.
    ///
    /// For a long spread this is `(exit_a - entry_a) * |a| - (exit_b - entry_b) * |b|`.
    pub fn exit_profit(&self, exit_a: Decimal, exit_b: Decimal) -> Decimal {
        (exit_a - self.entry_a) * self.leg_a_size + (exit_b - self.entry_b) * self.leg_b_size
    }

    /// Capital committed to the long leg at entry.
    pub fn long_leg_cost(&self) -> Decimal {
        match self.direction {
            SpreadDirection::Long => self.leg_a_size * self.entry_a,
            SpreadDirection::Short => self.leg_b_size * self.entry_b,
        }
    }
}
