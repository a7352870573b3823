//! Port traits for the external collaborators: the price feed, the
//! configuration source, and the report sink.

pub mod config_port;
pub mod feed_port;
pub mod report_port;
