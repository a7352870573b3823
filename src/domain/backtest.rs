//! Sequential single-position backtest.
//!
//! Replays the RSI signal bar by bar in date order. The three-indicator
//! overall signal is an alerting concern and deliberately plays no part
//! here; the two paths share nothing but the row model.

use super::error::GoldwatchError;
use super::position::{Position, TradeRecord};
use super::series::IndicatorRow;
use super::signal::{rsi_signal, Thresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub trades: Vec<TradeRecord>,
}

/// Replay the series against a fresh flat account.
///
/// Incomplete rows are skipped, not traded on. If the series ends while
/// still long, the position is force-liquidated at the last complete bar's
/// close so final capital is always a realized cash figure. An input with
/// no complete rows produces zero trades and unchanged capital.
pub fn run_backtest(
    rows: &[IndicatorRow],
    thresholds: &Thresholds,
    initial_capital: f64,
) -> Result<BacktestResult, GoldwatchError> {
    let mut position = Position::new(initial_capital);
    let mut trades: Vec<TradeRecord> = Vec::new();
    let mut last_complete: Option<&IndicatorRow> = None;

    for row in rows {
        if !row.is_complete() {
            continue;
        }
        let Some(rsi) = row.rsi else { continue };
        last_complete = Some(row);

        let signal = rsi_signal(rsi, thresholds);
        let (next, record) = position.apply(signal, row.date, row.close);
        next.check_invariant()?;
        position = next;
        if let Some(record) = record {
            trades.push(record);
        }
    }

    if let Some(row) = last_complete {
        let (next, record) = position.liquidate(row.date, row.close);
        next.check_invariant()?;
        position = next;
        if let Some(record) = record {
            trades.push(record);
        }
    }

    let final_capital = match position {
        Position::Flat { cash } => cash,
        // Unreachable: the terminal liquidation above always flattens.
        Position::Long { .. } => {
            return Err(GoldwatchError::InvariantViolation {
                reason: "backtest finished with an open position".to_string(),
            });
        }
    };

    Ok(BacktestResult {
        initial_capital,
        final_capital,
        trades,
    })
}
