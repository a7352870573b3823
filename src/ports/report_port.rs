//! Report delivery port trait and its boundary types.

use chrono::NaiveDate;

use crate::domain::error::GoldwatchError;
use crate::domain::signal::SignalSet;
use crate::domain::trade_stats::TradeStats;

/// Backtest figures attached to a report when the backtest path ran.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub stats: TradeStats,
}

/// The structured signal summary handed to a report adapter. Built entirely
/// by the caller; adapters only format and deliver it.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalReport {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub signals: SignalSet,
    pub backtest: Option<BacktestSummary>,
}

/// Port for delivering a signal report plus an optional rendered chart.
/// Delivery success or failure is the adapter's own concern.
pub trait ReportPort {
    fn deliver(&self, report: &SignalReport, chart_svg: Option<&str>)
        -> Result<(), GoldwatchError>;
}
