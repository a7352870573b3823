//! Domain error types.

/// Top-level error type for goldwatch.
#[derive(Debug, thiserror::Error)]
pub enum GoldwatchError {
    #[error("price feed error: {reason}")]
    Feed { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price series is empty")]
    EmptySeries,

    #[error("price series is not in ascending date order at {date}")]
    UnsortedSeries { date: chrono::NaiveDate },

    #[error("duplicate date {date} in price series")]
    DuplicateDate { date: chrono::NaiveDate },

    #[error("invalid close price {close} on {date}")]
    InvalidClose { date: chrono::NaiveDate, close: f64 },

    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&GoldwatchError> for std::process::ExitCode {
    fn from(err: &GoldwatchError) -> Self {
        let code: u8 = match err {
            GoldwatchError::Io(_) => 1,
            GoldwatchError::ConfigParse { .. }
            | GoldwatchError::ConfigMissing { .. }
            | GoldwatchError::ConfigInvalid { .. } => 2,
            GoldwatchError::Feed { .. }
            | GoldwatchError::NoData { .. }
            | GoldwatchError::InsufficientData { .. } => 3,
            GoldwatchError::EmptySeries
            | GoldwatchError::UnsortedSeries { .. }
            | GoldwatchError::DuplicateDate { .. }
            | GoldwatchError::InvalidClose { .. } => 4,
            GoldwatchError::InvariantViolation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
