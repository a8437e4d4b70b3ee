//! Logging utilities.
//!
//! The core only talks to the `log` facade. This module offers an optional
//! `env_logger` initializer for binaries and tests; the core never installs a
//! logger on its own.

mod init;

pub use init::{GL_TARGET, LoggingConfig, init_logging};
