//! CSV price feed adapter.
//!
//! Reads one `<SYMBOL>.csv` file per symbol from a base directory. Expected
//! columns: `date,close` with a header row. Rows before the requested start
//! date are dropped; output is sorted by date.

use crate::domain::error::GoldwatchError;
use crate::domain::price::PriceBar;
use crate::ports::feed_port::FeedPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvFeedAdapter {
    base_path: PathBuf,
}

impl CsvFeedAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl FeedPort for CsvFeedAdapter {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldwatchError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| GoldwatchError::Feed {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| GoldwatchError::Feed {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| GoldwatchError::Feed {
                reason: "missing date column".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                    GoldwatchError::Feed {
                        reason: format!("invalid date {:?}: {}", date_str, e),
                    }
                })?;

            if date < start_date {
                continue;
            }

            let close: f64 = record
                .get(1)
                .ok_or_else(|| GoldwatchError::Feed {
                    reason: "missing close column".into(),
                })?
                .parse()
                .map_err(|e| GoldwatchError::Feed {
                    reason: format!("invalid close value: {}", e),
                })?;

            bars.push(PriceBar { date, close });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, GoldwatchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| GoldwatchError::Feed {
            reason: format!("failed to read directory {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GoldwatchError::Feed {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,close\n\
            2024-01-15,61.20\n\
            2024-01-17,62.05\n\
            2024-01-16,61.80\n";
        fs::write(path.join("GOLDBEES.csv"), csv_content).unwrap();
        fs::write(path.join("GLD.csv"), "date,close\n").unwrap();
        fs::write(path.join("notes.txt"), "not a feed file").unwrap();

        (dir, path)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_closes_sorts_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvFeedAdapter::new(path);

        let bars = adapter
            .fetch_closes("GOLDBEES", date(2024, 1, 1))
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, date(2024, 1, 15));
        assert_eq!(bars[1].date, date(2024, 1, 16));
        assert_eq!(bars[2].date, date(2024, 1, 17));
        assert!((bars[1].close - 61.80).abs() < f64::EPSILON);
    }

    #[test]
    fn fetch_closes_filters_start_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvFeedAdapter::new(path);

        let bars = adapter
            .fetch_closes("GOLDBEES", date(2024, 1, 16))
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date(2024, 1, 16));
    }

    #[test]
    fn fetch_closes_empty_file_is_empty_not_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvFeedAdapter::new(path);

        let bars = adapter.fetch_closes("GLD", date(2024, 1, 1)).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn fetch_closes_missing_file_is_feed_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvFeedAdapter::new(path);

        let result = adapter.fetch_closes("SILVER", date(2024, 1, 1));
        assert!(matches!(result, Err(GoldwatchError::Feed { .. })));
    }

    #[test]
    fn fetch_closes_bad_close_value() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD.csv"),
            "date,close\n2024-01-15,sixty\n",
        )
        .unwrap();
        let adapter = CsvFeedAdapter::new(dir.path().to_path_buf());

        let result = adapter.fetch_closes("BAD", date(2024, 1, 1));
        assert!(matches!(result, Err(GoldwatchError::Feed { .. })));
    }

    #[test]
    fn list_symbols_ignores_non_csv() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvFeedAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["GLD", "GOLDBEES"]);
    }
}
