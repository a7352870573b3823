//! Outbox report adapter.
//!
//! Formats a signal report as a plain-text mail message and writes it to an
//! outbox directory, with the chart saved alongside it. Actual mail
//! transport is outside this system; whatever drains the outbox owns
//! delivery. Sender and recipients come from an explicit `DeliveryConfig`,
//! never from the environment.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::GoldwatchError;
use crate::domain::signal::Signal;
use crate::ports::report_port::{ReportPort, SignalReport};

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryConfig {
    pub sender: String,
    pub recipients: Vec<String>,
}

pub struct OutboxReportAdapter {
    outbox_dir: PathBuf,
    delivery: DeliveryConfig,
}

impl OutboxReportAdapter {
    pub fn new(outbox_dir: PathBuf, delivery: DeliveryConfig) -> Self {
        Self {
            outbox_dir,
            delivery,
        }
    }

    /// The message body shown to a human; headers are prepended on write.
    pub fn render_body(report: &SignalReport) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "Ticker: {}", report.symbol);
        let _ = writeln!(body, "Date: {}", report.date);
        let _ = writeln!(body);
        let _ = writeln!(body, "Signals:");
        let _ = writeln!(
            body,
            "- RSI {:.2} -> {}{}",
            report.rsi,
            report.signals.rsi,
            rsi_note(report.signals.rsi)
        );
        let _ = writeln!(
            body,
            "- EMA crossover {:.2} / {:.2} -> {}",
            report.ema_fast, report.ema_slow, report.signals.ema
        );
        let _ = writeln!(
            body,
            "- MACD {:.4} vs {:.4} -> {}",
            report.macd, report.macd_signal, report.signals.macd
        );
        let _ = writeln!(body);
        let _ = writeln!(body, "Overall: {}", report.signals.overall);
        let _ = writeln!(body, "Latest price: {:.2}", report.close);

        if let Some(backtest) = &report.backtest {
            let _ = writeln!(body);
            let _ = writeln!(body, "RSI backtest:");
            let _ = writeln!(body, "  Starting capital: {:.2}", backtest.initial_capital);
            let _ = writeln!(body, "  Final capital:    {:.2}", backtest.final_capital);
            let _ = writeln!(
                body,
                "  Trades: {} ({} wins, {} losses, {:.2}% win rate)",
                backtest.stats.completed.len(),
                backtest.stats.wins,
                backtest.stats.losses,
                backtest.stats.win_rate_pct
            );
            for trade in &backtest.stats.completed {
                let _ = writeln!(
                    body,
                    "  {} at {:.2} -> {} at {:.2} ({:+.2})",
                    trade.buy.action,
                    trade.buy.price,
                    trade.sell.action,
                    trade.sell.price,
                    trade.profit()
                );
            }
        }

        body
    }

    fn render_message(&self, report: &SignalReport) -> String {
        format!(
            "From: Gold ETF Alerts <{}>\nTo: {}\nSubject: {} trading signals ({})\n\n{}",
            self.delivery.sender,
            self.delivery.recipients.join(", "),
            report.symbol,
            report.date,
            Self::render_body(report)
        )
    }
}

fn rsi_note(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => " (oversold)",
        Signal::Sell => " (overbought)",
        Signal::Hold => "",
    }
}

impl ReportPort for OutboxReportAdapter {
    fn deliver(
        &self,
        report: &SignalReport,
        chart_svg: Option<&str>,
    ) -> Result<(), GoldwatchError> {
        fs::create_dir_all(&self.outbox_dir)?;

        let stem = format!("{}_{}", report.symbol, report.date);
        let message_path = self.outbox_dir.join(format!("{stem}.txt"));
        fs::write(&message_path, self.render_message(report))?;

        if let Some(svg) = chart_svg.filter(|s| !s.is_empty()) {
            let chart_path = self.outbox_dir.join(format!("{stem}.svg"));
            fs::write(&chart_path, svg)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{OverallSignal, SignalSet};
    use crate::domain::trade_stats::TradeStats;
    use crate::ports::report_port::BacktestSummary;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_report() -> SignalReport {
        SignalReport {
            symbol: "GOLDBEES".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            close: 62.15,
            rsi: 27.4,
            ema_fast: 61.9,
            ema_slow: 61.2,
            macd: 0.2113,
            macd_signal: 0.1875,
            signals: SignalSet {
                rsi: Signal::Buy,
                ema: Signal::Buy,
                macd: Signal::Buy,
                overall: OverallSignal::StrongBuy,
            },
            backtest: None,
        }
    }

    fn adapter(dir: &TempDir) -> OutboxReportAdapter {
        OutboxReportAdapter::new(
            dir.path().join("outbox"),
            DeliveryConfig {
                sender: "alerts@example.com".to_string(),
                recipients: vec!["one@example.com".to_string(), "two@example.com".to_string()],
            },
        )
    }

    #[test]
    fn body_contains_all_signal_lines() {
        let body = OutboxReportAdapter::render_body(&sample_report());
        assert!(body.contains("Ticker: GOLDBEES"));
        assert!(body.contains("RSI 27.40 -> BUY (oversold)"));
        assert!(body.contains("EMA crossover 61.90 / 61.20 -> BUY"));
        assert!(body.contains("MACD 0.2113 vs 0.1875 -> BUY"));
        assert!(body.contains("Overall: STRONG BUY"));
        assert!(body.contains("Latest price: 62.15"));
        assert!(!body.contains("backtest"));
    }

    #[test]
    fn body_includes_backtest_summary_when_present() {
        use crate::domain::position::{TradeAction, TradeRecord};

        let log = vec![
            TradeRecord {
                action: TradeAction::Buy,
                date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                price: 58.0,
                cash_after: 0.0,
                units_after: 172.4,
            },
            TradeRecord {
                action: TradeAction::EndOfPeriodSell,
                date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                price: 62.15,
                cash_after: 10715.0,
                units_after: 0.0,
            },
        ];
        let mut report = sample_report();
        report.backtest = Some(BacktestSummary {
            initial_capital: 10_000.0,
            final_capital: 10_715.0,
            stats: TradeStats::compute(&log).unwrap(),
        });

        let body = OutboxReportAdapter::render_body(&report);
        assert!(body.contains("Starting capital: 10000.00"));
        assert!(body.contains("Final capital:    10715.00"));
        assert!(body.contains("Trades: 1 (1 wins, 0 losses, 100.00% win rate)"));
        assert!(body.contains("SELL (end of period) at 62.15"));
    }

    #[test]
    fn deliver_writes_message_with_headers() {
        let dir = TempDir::new().unwrap();
        adapter(&dir).deliver(&sample_report(), None).unwrap();

        let message =
            fs::read_to_string(dir.path().join("outbox/GOLDBEES_2024-06-03.txt")).unwrap();
        assert!(message.starts_with("From: Gold ETF Alerts <alerts@example.com>"));
        assert!(message.contains("To: one@example.com, two@example.com"));
        assert!(message.contains("Subject: GOLDBEES trading signals (2024-06-03)"));
    }

    #[test]
    fn deliver_writes_chart_when_given() {
        let dir = TempDir::new().unwrap();
        adapter(&dir)
            .deliver(&sample_report(), Some("<svg></svg>"))
            .unwrap();

        let chart = fs::read_to_string(dir.path().join("outbox/GOLDBEES_2024-06-03.svg")).unwrap();
        assert_eq!(chart, "<svg></svg>");
    }

    #[test]
    fn deliver_skips_empty_chart() {
        let dir = TempDir::new().unwrap();
        adapter(&dir).deliver(&sample_report(), Some("")).unwrap();
        assert!(!dir.path().join("outbox/GOLDBEES_2024-06-03.svg").exists());
    }
}
