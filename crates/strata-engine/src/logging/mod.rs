//! Logging utilities.
//!
//! This module centralizes logger initialization and the per-frame
//! statistics sink. Library code only uses the `log` facade.

mod init;
mod stats;

pub use init::{init_logging, LoggingConfig};
pub use stats::log_stats;
