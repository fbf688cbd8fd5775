use thiserror::Error;

/// Process-level errors raised while bootstrapping or running the server.
///
/// Request-scoped failures have their own taxonomies in the library crates;
/// this type only covers what can stop the process.
#[derive(Error, Debug)]
pub enum HospitalError {
    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Socket bind or accept failures
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The HTTP server stopped with an error
    #[error("Server error: {0}")]
    ServerError(String),

    /// The record store could not be reached or initialised
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for process-level operations
pub type Result<T> = std::result::Result<T, HospitalError>;

/// Log a process-level error with its context.
pub fn log_error(context: &str, error: &HospitalError) {
    tracing::error!(
        context = context,
        error = %error,
        "Hospital engine error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_errors_convert_transparently() {
        let err: HospitalError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.to_string(), "socket closed");
    }

    #[test]
    fn config_error_carries_message() {
        let err = HospitalError::ConfigError("port must be non-zero".to_string());
        assert_eq!(err.to_string(), "Configuration error: port must be non-zero");
    }
}
