//! Server configuration.
//!
//! Layers, lowest priority first: built-in defaults, the optional config
//! file, then `HOSPITAL__*` environment variables
//! (`HOSPITAL__DATABASE__URL`, `HOSPITAL__LOGGING__LEVEL`, ...). CLI flags are
//! applied on top by the binary.

use auth_identity::IdentityConfig;
use config::{Config, ConfigError, Environment as EnvSource, File};
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "HOSPITAL";
pub const DEFAULT_CONFIG_FILE: &str = "hospital-server.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// No URL means the in-memory record store.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RxNormSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RxNormSettings {
    fn default() -> Self {
        Self {
            base_url: "https://rxnav.nlm.nih.gov/REST".to_string(),
            timeout_secs: 10,
        }
    }
}

/// First doctor account, created at start-up if missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    pub doctor_username: Option<String>,
    pub doctor_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub database: DatabaseSettings,
    pub identity: IdentityConfig,
    pub logging: LoggerConfig,
    pub rxnorm: RxNormSettings,
    pub bootstrap: BootstrapSettings,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            database: DatabaseSettings::default(),
            identity: IdentityConfig::default(),
            logging: LoggerConfig::default(),
            rxnorm: RxNormSettings::default(),
            bootstrap: BootstrapSettings::default(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Load defaults, then `path` if it exists, then the environment.
    ///
    /// # Errors
    ///
    /// Returns the `config` crate's error when a source cannot be parsed or a
    /// value has the wrong type.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                EnvSource::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Configuration for in-process tests: cheap hashing, no database.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            identity: IdentityConfig::for_tests(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
