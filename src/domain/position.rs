//! Single-position account state machine.
//!
//! The account is either fully in cash or fully in units, never partially
//! invested and never short. Transitions are pure: `apply` consumes the
//! current state and returns the next state plus the trade record it
//! produced, if any.

use chrono::NaiveDate;
use std::fmt;

use super::error::GoldwatchError;
use super::signal::Signal;

/// What a trade record represents. The end-of-period sell is a forced
/// mark-to-market liquidation, kept distinct from a strategy-driven exit so
/// reporting can tell them apart; the stats reducer counts both the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
    EndOfPeriodSell,
}

impl TradeAction {
    pub fn is_sell(&self) -> bool {
        matches!(self, TradeAction::Sell | TradeAction::EndOfPeriodSell)
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::EndOfPeriodSell => write!(f, "SELL (end of period)"),
        }
    }
}

/// Append-only ledger entry, one per executed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub action: TradeAction,
    pub date: NaiveDate,
    pub price: f64,
    pub cash_after: f64,
    pub units_after: f64,
}

/// Fully-flat or fully-long account state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat { cash: f64 },
    Long { units: f64 },
}

impl Position {
    pub fn new(initial_capital: f64) -> Self {
        Position::Flat {
            cash: initial_capital,
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Position::Long { .. })
    }

    /// Apply one bar's signal at the bar's close price.
    ///
    /// FLAT + BUY converts all cash to units; LONG + SELL converts all units
    /// back to cash. Every other (state, signal) pair is a no-op: a SELL
    /// while flat and a BUY while long are ignored by construction, and HOLD
    /// never trades.
    pub fn apply(self, signal: Signal, date: NaiveDate, price: f64) -> (Self, Option<TradeRecord>) {
        match (self, signal) {
            (Position::Flat { cash }, Signal::Buy) => {
                let units = cash / price;
                let next = Position::Long { units };
                let record = TradeRecord {
                    action: TradeAction::Buy,
                    date,
                    price,
                    cash_after: 0.0,
                    units_after: units,
                };
                (next, Some(record))
            }
            (Position::Long { units }, Signal::Sell) => {
                let cash = units * price;
                let next = Position::Flat { cash };
                let record = TradeRecord {
                    action: TradeAction::Sell,
                    date,
                    price,
                    cash_after: cash,
                    units_after: 0.0,
                };
                (next, Some(record))
            }
            (state, _) => (state, None),
        }
    }

    /// Forced liquidation at the end of the series while still long.
    pub fn liquidate(self, date: NaiveDate, price: f64) -> (Self, Option<TradeRecord>) {
        match self {
            Position::Long { units } => {
                let cash = units * price;
                let next = Position::Flat { cash };
                let record = TradeRecord {
                    action: TradeAction::EndOfPeriodSell,
                    date,
                    price,
                    cash_after: cash,
                    units_after: 0.0,
                };
                (next, Some(record))
            }
            flat => (flat, None),
        }
    }

    /// Fatal-error check run after every transition: holdings must be finite
    /// and non-negative, and the fully-invested rule leaves no state where
    /// both cash and units are positive.
    pub fn check_invariant(&self) -> Result<(), GoldwatchError> {
        let (cash, units) = match self {
            Position::Flat { cash } => (*cash, 0.0),
            Position::Long { units } => (0.0, *units),
        };
        if !cash.is_finite() || !units.is_finite() || cash < 0.0 || units < 0.0 {
            return Err(GoldwatchError::InvariantViolation {
                reason: format!("corrupt account state: cash {cash}, units {units}"),
            });
        }
        Ok(())
    }
}
