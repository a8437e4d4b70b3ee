use std::sync::Once;

use log::LevelFilter;

/// Module path of the GL backend, the target of its trace messages.
pub const GL_TARGET: &str = "vgl::backend::gl";

/// Logger setup for binaries and tests.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax. Overrides `RUST_LOG` and `level`.
    pub env_filter: Option<String>,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub level: LevelFilter,
    /// Adds a `trace` directive for [`GL_TARGET`] on top of the level.
    pub trace_gl: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            trace_gl: false,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Config with an explicit filter, ignoring `RUST_LOG`.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// Filter directives this config resolves to, given the `RUST_LOG` value.
    fn directives(&self, rust_log: Option<String>) -> String {
        if let Some(filter) = self.env_filter.clone().or(rust_log) {
            return filter;
        }
        let level = self.level.to_string().to_lowercase();
        if self.trace_gl {
            format!("{level},{GL_TARGET}=trace")
        } else {
            level
        }
    }
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend for the `log` facade.
///
/// Only the first call has an effect. If another logger is already installed
/// (a test harness, the host application) it is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let directives = config.directives(std::env::var("RUST_LOG").ok());
        let installed = env_logger::Builder::new()
            .parse_filters(&directives)
            .write_style(config.write_style)
            .try_init()
            .is_ok();
        if installed {
            log::debug!("logging initialized ({directives})");
        }
    });
}
