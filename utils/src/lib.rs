//! Shared utilities for presence verification.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
