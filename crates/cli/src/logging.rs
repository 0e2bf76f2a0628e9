//! Logging setup for the `autodial` binary

use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

/// `[logging]` section of the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset or empty; `RUST_LOG` replaces it otherwise
    pub level: String,
    /// Emit one JSON object per line
    pub json: bool,
    /// Include file and line information
    pub file_info: bool,
    /// Log span enter/exit
    pub log_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_info: false,
            log_spans: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Install the global subscriber
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let directives = filter_directives(&config.level, std::env::var("RUST_LOG").ok().as_deref())?;
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| anyhow!("invalid log filter {:?}: {}", directives, e))?;

    let span_events = if config.log_spans {
        FmtSpan::ACTIVE
    } else {
        FmtSpan::NONE
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    if config.json {
        subscriber
            .with_writer(std::io::stdout)
            .json()
            .try_init()
            .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;
    } else {
        subscriber
            .try_init()
            .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;
    }

    Ok(())
}

pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| anyhow!("invalid log level: {}", level))
}

/// Filter directives: `RUST_LOG` when it has any, the configured level otherwise
fn filter_directives(level: &str, rust_log: Option<&str>) -> Result<String> {
    let level = parse_log_level(level)?;
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => Ok(directives.to_string()),
        _ => Ok(level.to_string().to_lowercase()),
    }
}
