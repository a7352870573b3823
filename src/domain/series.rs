//! Indicator-augmented daily series.
//!
//! `build_series` validates the raw bars once at the feed boundary, computes
//! all indicator columns, and joins them into one row per trading day. A
//! column is `None` while its indicator is still warming up; a row is
//! *complete* once every column is defined. Incomplete rows are skipped by
//! signal derivation and backtesting, never acted on.

use chrono::NaiveDate;

use super::error::GoldwatchError;
use super::indicator::{calculate_ema, calculate_macd, calculate_rsi, IndicatorValue};
use super::price::{validate_bars, PriceBar};

/// Lookback parameters for the three indicator columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal_period: usize,
}

impl IndicatorConfig {
    /// Bars needed before the first complete row appears: the RSI column is
    /// the last to fill at `period + 1` bars, the slow EMA at `period`, and
    /// MACD at `slow + signal - 1`.
    pub fn min_bars(&self) -> usize {
        (self.rsi_period + 1)
            .max(self.ema_slow_period)
            .max(self.macd_slow + self.macd_signal_period - 1)
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            rsi_period: 14,
            ema_fast_period: 9,
            ema_slow_period: 21,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal_period: 9,
        }
    }
}

/// One trading day with its computed indicator columns.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl IndicatorRow {
    pub fn is_complete(&self) -> bool {
        self.rsi.is_some()
            && self.ema_fast.is_some()
            && self.ema_slow.is_some()
            && self.macd.is_some()
            && self.macd_signal.is_some()
    }
}

/// Build the indicator series from validated feed bars.
///
/// The returned rows are ordered by ascending date with no duplicates
/// (guaranteed by the input validation) and are not mutated by any later
/// stage.
pub fn build_series(
    bars: &[PriceBar],
    config: &IndicatorConfig,
) -> Result<Vec<IndicatorRow>, GoldwatchError> {
    validate_bars(bars)?;

    let rsi = calculate_rsi(bars, config.rsi_period);
    let ema_fast = calculate_ema(bars, config.ema_fast_period);
    let ema_slow = calculate_ema(bars, config.ema_slow_period);
    let macd = calculate_macd(
        bars,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal_period,
    );

    let simple_at = |series: &super::indicator::IndicatorSeries, i: usize| {
        series
            .values
            .get(i)
            .filter(|p| p.valid)
            .and_then(|p| p.value.simple())
    };

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (macd_line, macd_sig) = match macd.values.get(i).filter(|p| p.valid) {
                Some(point) => match point.value {
                    IndicatorValue::Macd { line, signal } => (Some(line), Some(signal)),
                    _ => (None, None),
                },
                None => (None, None),
            };
            IndicatorRow {
                date: bar.date,
                close: bar.close,
                rsi: simple_at(&rsi, i),
                ema_fast: simple_at(&ema_fast, i),
                ema_slow: simple_at(&ema_slow, i),
                macd: macd_line,
                macd_signal: macd_sig,
            }
        })
        .collect();

    Ok(rows)
}

/// The most recent complete row, if any. Signal reports are derived from
/// this row only.
pub fn latest_complete(rows: &[IndicatorRow]) -> Option<&IndicatorRow> {
    rows.iter().rev().find(|r| r.is_complete())
}
