//! Cash and position accounting for a single instrument.
//!
//! The ledger is a two-state machine (flat or long). Every fill happens at the
//! signal price; cash can never go negative.

use backtest_core::types::{
    to_decimal, OrderSize, Position, PositionView, Signal, SignalKind, Trade, TradeSide,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why the ledger refused a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Cash does not cover the purchase
    InsufficientFunds,
    /// The position already holds the maximum number of entries
    PositionLimit,
    /// Sell with nothing held
    NoPosition,
    /// Non-positive size or price, or a size the side cannot use
    InvalidOrder,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::InsufficientFunds => "insufficient funds",
            RejectReason::PositionLimit => "position limit reached",
            RejectReason::NoPosition => "no open position",
            RejectReason::InvalidOrder => "invalid order",
        };
        write!(f, "{}", s)
    }
}

/// Result of applying one signal.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOutcome {
    Executed(Trade),
    Rejected(RejectReason),
}

impl LedgerOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, LedgerOutcome::Executed(_))
    }
}

/// Single-instrument ledger.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    cash: Decimal,
    position: Option<Position>,
    max_entries: u32,
    total_profit: Decimal,
    trades: Vec<Trade>,
}

impl PositionLedger {
    /// Create a flat ledger. `max_entries` is clamped to at least 1.
    pub fn new(initial_cash: Decimal, max_entries: u32) -> Self {
        Self {
            cash: initial_cash,
            position: None,
            max_entries: max_entries.max(1),
            total_profit: Decimal::ZERO,
            trades: Vec::new(),
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// What a signal generator is allowed to see.
    pub fn view(&self) -> PositionView {
        self.position
            .as_ref()
            .map(Position::view)
            .unwrap_or_default()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Sum of realized profits.
    pub fn total_profit(&self) -> Decimal {
        self.total_profit
    }

    /// Value of the open position at `price`.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.position
            .as_ref()
            .map(|p| p.market_value(price))
            .unwrap_or(Decimal::ZERO)
    }

    /// Cash plus the open position marked at `price`.
    pub fn equity(&self, price: Decimal) -> Decimal {
        self.cash + self.market_value(price)
    }

    /// Apply one signal at its own price and timestamp.
    pub fn apply(&mut self, signal: &Signal) -> LedgerOutcome {
        let Some(price) = to_decimal(signal.price).filter(|p| *p > Decimal::ZERO) else {
            return LedgerOutcome::Rejected(RejectReason::InvalidOrder);
        };
        let result = match signal.kind {
            SignalKind::Buy => self.buy(signal.size, price, signal.timestamp),
            SignalKind::Sell => self.sell(signal.size, price, signal.timestamp),
        };
        match result {
            Ok(trade) => {
                self.trades.push(trade.clone());
                LedgerOutcome::Executed(trade)
            }
            Err(reason) => LedgerOutcome::Rejected(reason),
        }
    }

    /// Units a buy of `size` resolves to at `price`.
    pub fn resolve_buy_size(&self, size: OrderSize, price: Decimal) -> Option<Decimal> {
        let units = match size {
            OrderSize::Units(units) => units,
            OrderSize::RiskBudget {
                risk_fraction,
                atr,
                lot_size,
            } => {
                if atr <= Decimal::ZERO || lot_size <= Decimal::ZERO {
                    return None;
                }
                let units = risk_fraction * self.equity(price) / atr;
                (units / lot_size).floor() * lot_size
            }
            OrderSize::All => return None,
        };
        (units > Decimal::ZERO).then_some(units)
    }

    fn buy(&mut self, size: OrderSize, price: Decimal, timestamp: i64) -> Result<Trade, RejectReason> {
        if self
            .position
            .as_ref()
            .is_some_and(|p| p.entries >= self.max_entries)
        {
            return Err(RejectReason::PositionLimit);
        }
        let size = self
            .resolve_buy_size(size, price)
            .ok_or(RejectReason::InvalidOrder)?;
        let cost = price * size;
        if cost > self.cash {
            return Err(RejectReason::InsufficientFunds);
        }

        self.cash -= cost;
        let held = match self.position.as_mut() {
            Some(position) => {
                position.add(size, price);
                position.size
            }
            None => self.position.insert(Position::open(size, price, timestamp)).size,
        };

        Ok(Trade {
            timestamp,
            side: TradeSide::Buy,
            price,
            size,
            value: cost,
            resulting_position: held,
            profit: None,
            profit_percent: None,
        })
    }

    fn sell(&mut self, size: OrderSize, price: Decimal, timestamp: i64) -> Result<Trade, RejectReason> {
        let Some(position) = self.position.as_mut() else {
            return Err(RejectReason::NoPosition);
        };
        let requested = match size {
            OrderSize::Units(units) => units,
            OrderSize::All => position.size,
            OrderSize::RiskBudget { .. } => return Err(RejectReason::InvalidOrder),
        };
        if requested <= Decimal::ZERO {
            return Err(RejectReason::InvalidOrder);
        }

        let executed = requested.min(position.size);
        let entry = position.entry_price;
        let revenue = price * executed;
        let profit = (price - entry) * executed;
        let profit_percent = (entry > Decimal::ZERO)
            .then(|| (price / entry - Decimal::ONE) * Decimal::ONE_HUNDRED);

        position.size -= executed;
        let remaining = position.size;
        if remaining <= Decimal::ZERO {
            self.position = None;
        }
        self.cash += revenue;
        self.total_profit += profit;

        Ok(Trade {
            timestamp,
            side: TradeSide::Sell,
            price,
            size: executed,
            value: revenue,
            resulting_position: remaining.max(Decimal::ZERO),
            profit: Some(profit),
            profit_percent,
        })
    }

    /// Consume the ledger into its final cash, trades, realized profit and
    /// open position.
    pub fn into_parts(self) -> (Decimal, Vec<Trade>, Decimal, Option<Position>) {
        (self.cash, self.trades, self.total_profit, self.position)
    }
}
