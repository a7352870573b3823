//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::chart_svg;
use crate::adapters::csv_feed_adapter::CsvFeedAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::outbox_report_adapter::{DeliveryConfig, OutboxReportAdapter};
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::config_validation::{
    validate_backtest_config, validate_feed_config, validate_signal_config,
};
use crate::domain::error::GoldwatchError;
use crate::domain::series::{build_series, latest_complete, IndicatorConfig, IndicatorRow};
use crate::domain::signal::{classify, classify_series, Thresholds};
use crate::domain::trade_stats::TradeStats;
use crate::ports::config_port::ConfigPort;
use crate::ports::feed_port::FeedPort;
use crate::ports::report_port::{BacktestSummary, ReportPort, SignalReport};

#[derive(Parser, Debug)]
#[command(name = "goldwatch", about = "Gold ETF signal scanner and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the latest signals and write an alert to the outbox
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Include the RSI backtest in the alert
        #[arg(long)]
        with_backtest: bool,
    },
    /// Replay the RSI strategy and print the trade log
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the feed directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signal {
            config,
            symbol,
            with_backtest,
        } => run_signal(&config, symbol.as_deref(), with_backtest),
        Command::Backtest { config, symbol } => run_backtest_command(&config, symbol.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = GoldwatchError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_indicator_config(config: &dyn ConfigPort) -> IndicatorConfig {
    let defaults = IndicatorConfig::default();
    IndicatorConfig {
        rsi_period: config.get_usize("signals", "rsi_period", defaults.rsi_period),
        ema_fast_period: config.get_usize("signals", "ema_fast", defaults.ema_fast_period),
        ema_slow_period: config.get_usize("signals", "ema_slow", defaults.ema_slow_period),
        macd_fast: config.get_usize("signals", "macd_fast", defaults.macd_fast),
        macd_slow: config.get_usize("signals", "macd_slow", defaults.macd_slow),
        macd_signal_period: config.get_usize("signals", "macd_signal", defaults.macd_signal_period),
    }
}

pub fn build_thresholds(config: &dyn ConfigPort) -> Thresholds {
    let defaults = Thresholds::default();
    Thresholds {
        rsi_low: config.get_double("signals", "rsi_low", defaults.rsi_low),
        rsi_high: config.get_double("signals", "rsi_high", defaults.rsi_high),
    }
}

pub fn build_delivery_config(config: &dyn ConfigPort) -> DeliveryConfig {
    let recipients = config
        .get_string("report", "recipients")
        .map(|s| {
            s.split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default();
    DeliveryConfig {
        sender: config
            .get_string("report", "sender")
            .unwrap_or_else(|| "goldwatch@localhost".to_string()),
        recipients,
    }
}

pub fn resolve_symbol(symbol_override: Option<&str>, config: &dyn ConfigPort) -> Option<String> {
    if let Some(s) = symbol_override {
        return Some(s.trim().to_uppercase());
    }
    config
        .get_string("feed", "symbol")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

pub fn feed_start_date(config: &dyn ConfigPort) -> Result<NaiveDate, GoldwatchError> {
    let value = config
        .get_string("feed", "start_date")
        .ok_or_else(|| GoldwatchError::ConfigMissing {
            section: "feed".into(),
            key: "start_date".into(),
        })?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| GoldwatchError::ConfigInvalid {
        section: "feed".into(),
        key: "start_date".into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Fetch closes and build the indicator series, rejecting an empty feed and
/// a series too short to ever produce a complete row.
pub fn fetch_series(
    feed: &dyn FeedPort,
    symbol: &str,
    start_date: NaiveDate,
    indicators: &IndicatorConfig,
) -> Result<Vec<IndicatorRow>, GoldwatchError> {
    let bars = feed.fetch_closes(symbol, start_date)?;
    if bars.is_empty() {
        return Err(GoldwatchError::NoData {
            symbol: symbol.to_string(),
        });
    }
    if bars.len() < indicators.min_bars() {
        return Err(GoldwatchError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum: indicators.min_bars(),
        });
    }
    build_series(&bars, indicators)
}

/// Assemble the signal report from the latest complete row, optionally
/// running the RSI backtest over the whole series. `min_bars` is only for
/// the error message when no row is complete.
pub fn build_signal_report(
    rows: &[IndicatorRow],
    symbol: &str,
    thresholds: &Thresholds,
    min_bars: usize,
    backtest_capital: Option<f64>,
) -> Result<SignalReport, GoldwatchError> {
    let latest = latest_complete(rows).ok_or_else(|| GoldwatchError::InsufficientData {
        symbol: symbol.to_string(),
        bars: rows.len(),
        minimum: min_bars,
    })?;
    let signals = classify(latest, thresholds).ok_or_else(|| {
        // latest_complete only returns complete rows.
        GoldwatchError::InvariantViolation {
            reason: "complete row failed to classify".to_string(),
        }
    })?;

    let backtest = match backtest_capital {
        Some(capital) => {
            let result = run_backtest(rows, thresholds, capital)?;
            Some(BacktestSummary {
                initial_capital: result.initial_capital,
                final_capital: result.final_capital,
                stats: TradeStats::compute(&result.trades)?,
            })
        }
        None => None,
    };

    Ok(SignalReport {
        symbol: symbol.to_string(),
        date: latest.date,
        close: latest.close,
        rsi: latest.rsi.unwrap_or_default(),
        ema_fast: latest.ema_fast.unwrap_or_default(),
        ema_slow: latest.ema_slow.unwrap_or_default(),
        macd: latest.macd.unwrap_or_default(),
        macd_signal: latest.macd_signal.unwrap_or_default(),
        signals,
        backtest,
    })
}

fn validate_all(config: &dyn ConfigPort) -> Result<(), GoldwatchError> {
    validate_feed_config(config)?;
    validate_signal_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

fn build_feed(config: &dyn ConfigPort) -> CsvFeedAdapter {
    let dir = config
        .get_string("feed", "csv_dir")
        .unwrap_or_else(|| "data".to_string());
    CsvFeedAdapter::new(PathBuf::from(dir))
}

fn run_signal(config_path: &PathBuf, symbol_override: Option<&str>, with_backtest: bool) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let Some(symbol) = resolve_symbol(symbol_override, &adapter) else {
        eprintln!("error: symbol is required (use --symbol or set [feed] symbol)");
        return ExitCode::from(2);
    };
    let start_date = match feed_start_date(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let indicators = build_indicator_config(&adapter);
    let thresholds = build_thresholds(&adapter);
    let feed = build_feed(&adapter);

    eprintln!("Fetching {} closes from {}", symbol, start_date);
    let rows = match fetch_series(&feed, &symbol, start_date, &indicators) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let capital = with_backtest
        .then(|| adapter.get_double("backtest", "initial_capital", 10_000.0));
    let report = match build_signal_report(&rows, &symbol, &thresholds, indicators.min_bars(), capital)
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Console summary mirrors the alert body.
    println!("Latest signals ({})", report.symbol);
    println!("  Date:     {}", report.date);
    println!("  Price:    {:.2}", report.close);
    println!("  RSI:      {:.2} -> {}", report.rsi, report.signals.rsi);
    println!(
        "  EMA:      {:.2} / {:.2} -> {}",
        report.ema_fast, report.ema_slow, report.signals.ema
    );
    println!(
        "  MACD:     {:.4} vs {:.4} -> {}",
        report.macd, report.macd_signal, report.signals.macd
    );
    println!("  Overall:  {}", report.signals.overall);

    let sweep = classify_series(&rows, &thresholds);
    if !sweep.is_empty() {
        println!("\nRecent signals:");
        let tail = sweep.len().saturating_sub(10);
        for (date, set) in &sweep[tail..] {
            println!(
                "  {}  rsi {:<4} ema {:<4} macd {:<4} overall {}",
                date,
                set.rsi.to_string(),
                set.ema.to_string(),
                set.macd.to_string(),
                set.overall
            );
        }
    }

    let chart_enabled = adapter.get_bool("report", "chart", true);
    let chart = chart_enabled.then(|| chart_svg::render_chart(&rows, &symbol, &thresholds));

    let outbox_dir = adapter
        .get_string("report", "output_dir")
        .unwrap_or_else(|| "outbox".to_string());
    let report_port = OutboxReportAdapter::new(
        PathBuf::from(&outbox_dir),
        build_delivery_config(&adapter),
    );
    match report_port.deliver(&report, chart.as_deref()) {
        Ok(()) => {
            eprintln!("\nAlert written to {}", outbox_dir);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write alert: {e}");
            (&e).into()
        }
    }
}

fn run_backtest_command(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let Some(symbol) = resolve_symbol(symbol_override, &adapter) else {
        eprintln!("error: symbol is required (use --symbol or set [feed] symbol)");
        return ExitCode::from(2);
    };
    let start_date = match feed_start_date(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let indicators = build_indicator_config(&adapter);
    let thresholds = build_thresholds(&adapter);
    let capital = adapter.get_double("backtest", "initial_capital", 10_000.0);
    let feed = build_feed(&adapter);

    eprintln!("Fetching {} closes from {}", symbol, start_date);
    let rows = match fetch_series(&feed, &symbol, start_date, &indicators) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Running RSI backtest over {} bars ({} complete)",
        rows.len(),
        rows.iter().filter(|r| r.is_complete()).count()
    );
    let result = match run_backtest(&rows, &thresholds, capital) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let stats = match TradeStats::compute(&result.trades) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_backtest_summary(&result, &stats);
    ExitCode::SUCCESS
}

fn print_backtest_summary(result: &BacktestResult, stats: &TradeStats) {
    println!("Starting portfolio value: {:.2}", result.initial_capital);
    println!("Final portfolio value:    {:.2}", result.final_capital);
    println!("Total trades: {}", stats.completed.len());
    println!(
        "Wins: {}  Losses: {}  Win rate: {:.2}%",
        stats.wins, stats.losses, stats.win_rate_pct
    );
    println!("Average profit/loss per trade: {:.2}", stats.avg_profit);

    if !result.trades.is_empty() {
        println!("\nTrade log:");
        for trade in &result.trades {
            if trade.action.is_sell() {
                println!(
                    "  {} {} at {:.2} -> cash {:.2}",
                    trade.date, trade.action, trade.price, trade.cash_after
                );
            } else {
                println!(
                    "  {} {} at {:.2} -> {:.4} units",
                    trade.date, trade.action, trade.price, trade.units_after
                );
            }
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let indicators = build_indicator_config(&adapter);
    let thresholds = build_thresholds(&adapter);

    eprintln!("\nParameters:");
    eprintln!("  RSI period:      {}", indicators.rsi_period);
    eprintln!(
        "  RSI thresholds:  {} / {}",
        thresholds.rsi_low, thresholds.rsi_high
    );
    eprintln!(
        "  EMA periods:     {} / {}",
        indicators.ema_fast_period, indicators.ema_slow_period
    );
    eprintln!(
        "  MACD:            {}/{}/{}",
        indicators.macd_fast, indicators.macd_slow, indicators.macd_signal_period
    );
    eprintln!("  Warm-up bars:    {}", indicators.min_bars());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let feed = build_feed(&adapter);
    let symbols = match feed.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in feed directory");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
