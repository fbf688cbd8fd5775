use crypto::Argon2Settings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub min_password_length: usize,
    pub argon2: Argon2Settings,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            argon2: Argon2Settings::default(),
        }
    }
}

impl IdentityConfig {
    /// Cheapest hashing parameters; keeps test suites fast.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            min_password_length: 4,
            argon2: Argon2Settings::insecure_fast(),
        }
    }

    /// # Errors
    ///
    /// Returns a caller-facing message when `password` is too short.
    pub fn check_password(&self, password: &str) -> Result<(), String> {
        if password.chars().count() < self.min_password_length {
            return Err(format!(
                "Password must be at least {} characters long",
                self.min_password_length
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_length_policy() {
        let config = IdentityConfig::default();
        assert!(config.check_password("short").is_err());
        assert!(config.check_password("long enough").is_ok());
    }
}
