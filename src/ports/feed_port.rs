//! Price feed port trait.

use crate::domain::error::GoldwatchError;
use crate::domain::price::PriceBar;
use chrono::NaiveDate;

/// Supplies daily close prices for a symbol from a start date onward.
///
/// Implementations return bars in ascending date order. An empty result is
/// legal here; the caller decides whether that is fatal. Calendar gaps
/// (weekends, holidays) are expected and carry no meaning.
pub trait FeedPort {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldwatchError>;

    fn list_symbols(&self) -> Result<Vec<String>, GoldwatchError>;
}
