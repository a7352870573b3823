//! Per-indicator signal classification and the majority-vote overall signal.
//!
//! Classification is a pure function of one complete row plus the RSI
//! thresholds. The three per-indicator rules are deliberately not uniform:
//! RSI treats threshold equality as HOLD, while the EMA-crossover and MACD
//! rules have no HOLD case at all and resolve equality to SELL. That
//! asymmetry is inherited behavior and is kept as-is.

use chrono::NaiveDate;
use std::fmt;

use super::error::GoldwatchError;
use super::series::IndicatorRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallSignal {
    StrongBuy,
    Buy,
    StrongSell,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

impl fmt::Display for OverallSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallSignal::StrongBuy => write!(f, "STRONG BUY"),
            OverallSignal::Buy => write!(f, "BUY"),
            OverallSignal::StrongSell => write!(f, "STRONG SELL"),
            OverallSignal::Sell => write!(f, "SELL"),
            OverallSignal::Hold => write!(f, "HOLD"),
        }
    }
}

/// RSI oversold/overbought thresholds. Contract: 0 < low < high < 100,
/// checked by config validation before a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub rsi_low: f64,
    pub rsi_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            rsi_low: 30.0,
            rsi_high: 70.0,
        }
    }
}

/// The three per-indicator ballots and their aggregate for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSet {
    pub rsi: Signal,
    pub ema: Signal,
    pub macd: Signal,
    pub overall: OverallSignal,
}

/// RSI rule: below the low threshold is oversold (BUY), above the high
/// threshold overbought (SELL). Equality to either threshold is HOLD.
pub fn rsi_signal(rsi: f64, thresholds: &Thresholds) -> Signal {
    if rsi < thresholds.rsi_low {
        Signal::Buy
    } else if rsi > thresholds.rsi_high {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// EMA crossover: fast strictly above slow is BUY, everything else SELL.
pub fn ema_signal(ema_fast: f64, ema_slow: f64) -> Signal {
    if ema_fast > ema_slow {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

/// MACD line strictly above its signal line is BUY, everything else SELL.
pub fn macd_signal(macd: f64, signal_line: f64) -> Signal {
    if macd > signal_line {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

/// Majority vote over the three ballots. HOLD never wins a majority: a
/// unanimous vote upgrades to STRONG, two-of-three carries, anything else
/// (including any mixed vote containing a HOLD) is HOLD.
pub fn overall_signal(rsi: Signal, ema: Signal, macd: Signal) -> OverallSignal {
    let ballots = [rsi, ema, macd];
    let buys = ballots.iter().filter(|&&s| s == Signal::Buy).count();
    let sells = ballots.iter().filter(|&&s| s == Signal::Sell).count();

    match (buys, sells) {
        (3, _) => OverallSignal::StrongBuy,
        (2, _) => OverallSignal::Buy,
        (_, 3) => OverallSignal::StrongSell,
        (_, 2) => OverallSignal::Sell,
        _ => OverallSignal::Hold,
    }
}

/// Classify one complete row. Returns `None` for an incomplete row, which
/// the caller skips rather than treating as an error.
pub fn classify(row: &IndicatorRow, thresholds: &Thresholds) -> Option<SignalSet> {
    let rsi = rsi_signal(row.rsi?, thresholds);
    let ema = ema_signal(row.ema_fast?, row.ema_slow?);
    let macd = macd_signal(row.macd?, row.macd_signal?);
    Some(SignalSet {
        rsi,
        ema,
        macd,
        overall: overall_signal(rsi, ema, macd),
    })
}

/// Historical sweep: classify every complete row in date order.
pub fn classify_series(
    rows: &[IndicatorRow],
    thresholds: &Thresholds,
) -> Vec<(NaiveDate, SignalSet)> {
    rows.iter()
        .filter_map(|row| classify(row, thresholds).map(|set| (row.date, set)))
        .collect()
}

/// Check the threshold contract. Not part of classification itself; the
/// CLI runs this (via config validation) before touching any data.
pub fn validate_thresholds(thresholds: &Thresholds) -> Result<(), GoldwatchError> {
    if !(0.0 < thresholds.rsi_low
        && thresholds.rsi_low < thresholds.rsi_high
        && thresholds.rsi_high < 100.0)
    {
        return Err(GoldwatchError::ConfigInvalid {
            section: "signals".to_string(),
            key: "rsi_low/rsi_high".to_string(),
            reason: format!(
                "thresholds must satisfy 0 < low < high < 100, got {} / {}",
                thresholds.rsi_low, thresholds.rsi_high
            ),
        });
    }
    Ok(())
}
