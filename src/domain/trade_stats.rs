//! Win/loss statistics over a completed trade log.
//!
//! A stateless reducer, separate from the backtest state machine: each SELL
//! record is paired with the immediately preceding BUY record by log
//! position. Profit is the absolute per-unit price difference (sell price
//! minus buy price), not a percentage return; a trade with zero profit
//! counts as a loss.

use super::error::GoldwatchError;
use super::position::{TradeAction, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTrade {
    pub buy: TradeRecord,
    pub sell: TradeRecord,
}

impl CompletedTrade {
    /// Per-unit profit: sell price minus buy price.
    pub fn profit(&self) -> f64 {
        self.sell.price - self.buy.price
    }

    /// Strictly positive profit wins; zero is a loss.
    pub fn is_win(&self) -> bool {
        self.profit() > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub completed: Vec<CompletedTrade>,
    pub wins: usize,
    pub losses: usize,
    pub win_rate_pct: f64,
    pub avg_profit: f64,
}

impl TradeStats {
    /// Reduce a chronological trade log to win/loss statistics.
    ///
    /// A SELL with no unmatched BUY before it cannot be produced by the
    /// backtest state machine; observing one means the log is corrupt and
    /// the run aborts rather than report misleading numbers. A trailing
    /// unmatched BUY (possible when the reducer is fed a partial log) is
    /// simply not a completed trade.
    pub fn compute(trades: &[TradeRecord]) -> Result<Self, GoldwatchError> {
        let mut completed = Vec::new();
        let mut pending_buy: Option<&TradeRecord> = None;

        for record in trades {
            match record.action {
                TradeAction::Buy => {
                    if pending_buy.is_some() {
                        return Err(GoldwatchError::InvariantViolation {
                            reason: format!("BUY on {} while already long", record.date),
                        });
                    }
                    pending_buy = Some(record);
                }
                TradeAction::Sell | TradeAction::EndOfPeriodSell => {
                    let Some(buy) = pending_buy.take() else {
                        return Err(GoldwatchError::InvariantViolation {
                            reason: format!("SELL on {} with no matching BUY", record.date),
                        });
                    };
                    completed.push(CompletedTrade {
                        buy: buy.clone(),
                        sell: record.clone(),
                    });
                }
            }
        }

        let wins = completed.iter().filter(|t| t.is_win()).count();
        let losses = completed.len() - wins;
        let win_rate_pct = if completed.is_empty() {
            0.0
        } else {
            wins as f64 / completed.len() as f64 * 100.0
        };
        let avg_profit = if completed.is_empty() {
            0.0
        } else {
            completed.iter().map(|t| t.profit()).sum::<f64>() / completed.len() as f64
        };

        Ok(TradeStats {
            completed,
            wins,
            losses,
            win_rate_pct,
            avg_profit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(action: TradeAction, day: u32, price: f64) -> TradeRecord {
        TradeRecord {
            action,
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            price,
            cash_after: if action.is_sell() { 100.0 } else { 0.0 },
            units_after: if action.is_sell() { 0.0 } else { 10.0 },
        }
    }

    #[test]
    fn empty_log_is_all_zeros() {
        let stats = TradeStats::compute(&[]).unwrap();
        assert!(stats.completed.is_empty());
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.losses, 0);
        assert!((stats.win_rate_pct - 0.0).abs() < f64::EPSILON);
        assert!((stats.avg_profit - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_winning_trade() {
        let log = vec![
            record(TradeAction::Buy, 1, 10.0),
            record(TradeAction::Sell, 5, 15.0),
        ];
        let stats = TradeStats::compute(&log).unwrap();
        assert_eq!(stats.completed.len(), 1);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 0);
        assert!((stats.completed[0].profit() - 5.0).abs() < f64::EPSILON);
        assert!((stats.win_rate_pct - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_profit_is_a_loss() {
        let log = vec![
            record(TradeAction::Buy, 1, 10.0),
            record(TradeAction::Sell, 5, 10.0),
        ];
        let stats = TradeStats::compute(&log).unwrap();
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.losses, 1);
        assert!(!stats.completed[0].is_win());
    }

    #[test]
    fn end_of_period_sell_completes_a_trade() {
        let log = vec![
            record(TradeAction::Buy, 1, 10.0),
            record(TradeAction::EndOfPeriodSell, 9, 8.0),
        ];
        let stats = TradeStats::compute(&log).unwrap();
        assert_eq!(stats.completed.len(), 1);
        assert_eq!(stats.losses, 1);
        assert!((stats.completed[0].profit() - (-2.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn mixed_log_win_rate_and_avg() {
        let log = vec![
            record(TradeAction::Buy, 1, 10.0),
            record(TradeAction::Sell, 2, 14.0),
            record(TradeAction::Buy, 3, 14.0),
            record(TradeAction::Sell, 4, 12.0),
            record(TradeAction::Buy, 5, 12.0),
            record(TradeAction::EndOfPeriodSell, 6, 13.0),
        ];
        let stats = TradeStats::compute(&log).unwrap();
        assert_eq!(stats.completed.len(), 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        approx::assert_relative_eq!(stats.win_rate_pct, 200.0 / 3.0, max_relative = 1e-12);
        // Profits: +4, -2, +1.
        approx::assert_relative_eq!(stats.avg_profit, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn trailing_open_buy_is_not_completed() {
        let log = vec![
            record(TradeAction::Buy, 1, 10.0),
            record(TradeAction::Sell, 2, 11.0),
            record(TradeAction::Buy, 3, 11.0),
        ];
        let stats = TradeStats::compute(&log).unwrap();
        assert_eq!(stats.completed.len(), 1);
    }

    #[test]
    fn orphan_sell_is_fatal() {
        let log = vec![record(TradeAction::Sell, 1, 10.0)];
        assert!(matches!(
            TradeStats::compute(&log),
            Err(GoldwatchError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn double_buy_is_fatal() {
        let log = vec![
            record(TradeAction::Buy, 1, 10.0),
            record(TradeAction::Buy, 2, 11.0),
        ];
        assert!(matches!(
            TradeStats::compute(&log),
            Err(GoldwatchError::InvariantViolation { .. })
        ));
    }
}
