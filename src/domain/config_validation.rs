//! Configuration validation.
//!
//! Every parameter contract is checked up front, before any data is
//! fetched; a run either starts with a fully valid configuration or not at
//! all.

use chrono::NaiveDate;

use super::error::GoldwatchError;
use super::series::IndicatorConfig;
use super::signal::{validate_thresholds, Thresholds};
use crate::ports::config_port::ConfigPort;

pub fn validate_feed_config(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    validate_symbol(config)?;
    validate_start_date(config)?;
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    validate_periods(config)?;
    let thresholds = Thresholds {
        rsi_low: config.get_double("signals", "rsi_low", 30.0),
        rsi_high: config.get_double("signals", "rsi_high", 70.0),
    };
    validate_thresholds(&thresholds)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    let capital = config.get_double("backtest", "initial_capital", 10_000.0);
    if !capital.is_finite() || capital <= 0.0 {
        return Err(GoldwatchError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    match config.get_string("feed", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(GoldwatchError::ConfigInvalid {
            section: "feed".to_string(),
            key: "symbol".to_string(),
            reason: "symbol must not be blank".to_string(),
        }),
        None => Err(GoldwatchError::ConfigMissing {
            section: "feed".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_start_date(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    let value = config
        .get_string("feed", "start_date")
        .ok_or_else(|| GoldwatchError::ConfigMissing {
            section: "feed".to_string(),
            key: "start_date".to_string(),
        })?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| GoldwatchError::ConfigInvalid {
        section: "feed".to_string(),
        key: "start_date".to_string(),
        reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
    })?;
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    let defaults = IndicatorConfig::default();
    let keys = [
        ("rsi_period", defaults.rsi_period),
        ("ema_fast", defaults.ema_fast_period),
        ("ema_slow", defaults.ema_slow_period),
        ("macd_fast", defaults.macd_fast),
        ("macd_slow", defaults.macd_slow),
        ("macd_signal", defaults.macd_signal_period),
    ];
    for (key, default) in keys {
        if config.get_usize("signals", key, default) == 0 {
            return Err(GoldwatchError::ConfigInvalid {
                section: "signals".to_string(),
                key: key.to_string(),
                reason: "period must be at least 1".to_string(),
            });
        }
    }

    let ema_fast = config.get_usize("signals", "ema_fast", defaults.ema_fast_period);
    let ema_slow = config.get_usize("signals", "ema_slow", defaults.ema_slow_period);
    if ema_fast >= ema_slow {
        return Err(GoldwatchError::ConfigInvalid {
            section: "signals".to_string(),
            key: "ema_fast".to_string(),
            reason: format!("fast period {ema_fast} must be shorter than slow period {ema_slow}"),
        });
    }

    let macd_fast = config.get_usize("signals", "macd_fast", defaults.macd_fast);
    let macd_slow = config.get_usize("signals", "macd_slow", defaults.macd_slow);
    if macd_fast >= macd_slow {
        return Err(GoldwatchError::ConfigInvalid {
            section: "signals".to_string(),
            key: "macd_fast".to_string(),
            reason: format!("fast period {macd_fast} must be shorter than slow period {macd_slow}"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const VALID_INI: &str = r#"
[feed]
csv_dir = data
symbol = GOLDBEES
start_date = 2022-01-01

[signals]
rsi_period = 14
rsi_low = 30
rsi_high = 70
ema_fast = 9
ema_slow = 21
macd_fast = 12
macd_slow = 26
macd_signal = 9

[backtest]
initial_capital = 10000
"#;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes_all() {
        let config = adapter(VALID_INI);
        assert!(validate_feed_config(&config).is_ok());
        assert!(validate_signal_config(&config).is_ok());
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn defaults_pass_when_signals_section_absent() {
        let config = adapter("[feed]\nsymbol = GLD\nstart_date = 2022-01-01\n");
        assert!(validate_signal_config(&config).is_ok());
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn missing_symbol() {
        let config = adapter("[feed]\nstart_date = 2022-01-01\n");
        assert!(matches!(
            validate_feed_config(&config),
            Err(GoldwatchError::ConfigMissing { key, .. }) if key == "symbol"
        ));
    }

    #[test]
    fn blank_symbol() {
        let config = adapter("[feed]\nsymbol =  \nstart_date = 2022-01-01\n");
        assert!(matches!(
            validate_feed_config(&config),
            Err(GoldwatchError::ConfigInvalid { key, .. }) if key == "symbol"
        ));
    }

    #[test]
    fn bad_start_date() {
        let config = adapter("[feed]\nsymbol = GLD\nstart_date = 01/01/2022\n");
        assert!(matches!(
            validate_feed_config(&config),
            Err(GoldwatchError::ConfigInvalid { key, .. }) if key == "start_date"
        ));
    }

    #[test]
    fn zero_period_rejected() {
        let config = adapter("[signals]\nrsi_period = 0\n");
        assert!(matches!(
            validate_signal_config(&config),
            Err(GoldwatchError::ConfigInvalid { key, .. }) if key == "rsi_period"
        ));
    }

    #[test]
    fn ema_fast_must_be_shorter() {
        let config = adapter("[signals]\nema_fast = 21\nema_slow = 9\n");
        assert!(validate_signal_config(&config).is_err());

        let config = adapter("[signals]\nema_fast = 21\nema_slow = 21\n");
        assert!(validate_signal_config(&config).is_err());
    }

    #[test]
    fn macd_fast_must_be_shorter() {
        let config = adapter("[signals]\nmacd_fast = 26\nmacd_slow = 12\n");
        assert!(validate_signal_config(&config).is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = adapter("[signals]\nrsi_low = 70\nrsi_high = 30\n");
        assert!(validate_signal_config(&config).is_err());
    }

    #[test]
    fn non_positive_capital_rejected() {
        let config = adapter("[backtest]\ninitial_capital = 0\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(GoldwatchError::ConfigInvalid { key, .. }) if key == "initial_capital"
        ));

        let config = adapter("[backtest]\ninitial_capital = -100\n");
        assert!(validate_backtest_config(&config).is_err());
    }
}
