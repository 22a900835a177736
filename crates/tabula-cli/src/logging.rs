//! Logging setup for the tabula CLI
//!
//! Logs go to stderr so that statement output on stdout stays pipeable.
//! `RUST_LOG` takes precedence over the configured default filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level filter
    pub default_filter: String,

    /// Whether to colour console output
    pub ansi: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn,tabula_designer=info,tabula_schema=info".to_string(),
            ansi: true,
            include_location: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    /// Everything from the tabula crates down to debug
    pub fn verbose() -> Self {
        Self {
            default_filter: "info,tabula_designer=debug,tabula_schema=debug,tabula_cli=debug"
                .to_string(),
            ..Self::default()
        }
    }

    /// Errors only
    pub fn quiet() -> Self {
        Self {
            default_filter: "error".to_string(),
            ..Self::default()
        }
    }
}

/// Install the global subscriber
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()?;

    tracing::debug!(filter = %config.default_filter, "logging initialized");
    Ok(())
}
