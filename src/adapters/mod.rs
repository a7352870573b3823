//! Concrete implementations of the port traits.

pub mod chart_svg;
pub mod csv_feed_adapter;
pub mod file_config_adapter;
pub mod outbox_report_adapter;
