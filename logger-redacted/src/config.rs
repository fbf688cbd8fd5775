use serde::{Deserialize, Serialize};

use crate::redactor::RedactionConfig;

/// Logging section of the server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
    pub redaction_enabled: bool,
    pub hash_for_correlation: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            redaction_enabled: true,
            hash_for_correlation: true,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn redaction(&self) -> RedactionConfig {
        if !self.redaction_enabled {
            return RedactionConfig::disabled();
        }
        RedactionConfig {
            hash_for_correlation: self.hash_for_correlation,
            ..RedactionConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_redaction_maps_to_passthrough() {
        let config = LoggerConfig {
            redaction_enabled: false,
            ..LoggerConfig::default()
        };
        let redaction = config.redaction();
        assert!(!redaction.redact_emails);
        assert!(!redaction.redact_phones);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: LoggerConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert!(config.json);
        assert_eq!(config.level, "info");
        assert!(config.redaction_enabled);
    }
}
