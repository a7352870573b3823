#![allow(dead_code)]

use chrono::NaiveDate;
use goldwatch::domain::error::GoldwatchError;
use goldwatch::domain::price::PriceBar;
use goldwatch::domain::series::{IndicatorConfig, IndicatorRow};
use goldwatch::ports::feed_port::FeedPort;
use std::collections::HashMap;

pub struct MockFeed {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl FeedPort for MockFeed {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldwatchError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(GoldwatchError::Feed {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, GoldwatchError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        close,
    }
}

/// Consecutive daily bars starting at `start_date`, closes generated with a
/// mild oscillation so every indicator gets both gains and losses.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            close: start_price + ((i * 5) % 13) as f64 * 0.5 - 3.0,
        })
        .collect()
}

/// A hand-built complete row for classifier/backtest scenarios where the
/// indicator values themselves are the test inputs.
pub fn complete_row(day: u32, close: f64, rsi: f64) -> IndicatorRow {
    IndicatorRow {
        date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
        close,
        rsi: Some(rsi),
        ema_fast: Some(close + 0.5),
        ema_slow: Some(close - 0.5),
        macd: Some(0.3),
        macd_signal: Some(0.1),
    }
}

/// Small periods so integration scenarios need few bars.
pub fn short_indicator_config() -> IndicatorConfig {
    IndicatorConfig {
        rsi_period: 3,
        ema_fast_period: 2,
        ema_slow_period: 4,
        macd_fast: 3,
        macd_slow: 5,
        macd_signal_period: 2,
    }
}
