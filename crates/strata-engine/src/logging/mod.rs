//! Logging utilities.
//!
//! Everything in the engine logs through the `log` facade; this module only
//! installs `env_logger` as the backend.

mod init;

pub use init::{init_logging, LoggingConfig};
