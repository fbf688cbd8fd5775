use std::env;

use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggerConfig;
use crate::{install_redactor, PiiRedactor};

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global subscriber and the message redactor.
///
/// `RUST_LOG` wins over `config.level`. JSON output is used when
/// `config.json` is set or when stdout is not a terminal; otherwise lines are
/// human readable with ANSI colours unless `NO_COLOR` is present.
///
/// # Errors
///
/// Fails when the filter directive does not parse or a subscriber was
/// already installed by someone else.
pub fn init_tracing(config: &LoggerConfig, verbose: bool) -> Result<(), LoggerError> {
    install_redactor(PiiRedactor::new(config.redaction()));

    let directive = if verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    };

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "{directive},tower_http=info,sqlx=warn,hyper=info,reqwest=info"
        ))
        .map_err(|e| LoggerError::InvalidFilter {
            directive: directive.clone(),
            reason: e.to_string(),
        })?,
    };

    let interactive = atty::is(atty::Stream::Stdout);
    let use_colors = env::var("NO_COLOR").is_err() && interactive;

    if config.json || !interactive {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
            .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_colors)
                    .with_level(true),
            )
            .try_init()
            .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
    }
}
