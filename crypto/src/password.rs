use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};

/// Argon2id cost settings used for newly created hashes.
///
/// Verification always uses the parameters embedded in the stored PHC
/// string, so changing these never locks out existing accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Settings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    fn default() -> Self {
        // OWASP baseline for Argon2id
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Settings {
    /// Smallest parameters argon2 accepts. Only for tests.
    #[must_use]
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// Recognised encodings of a stored password hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// PHC string, e.g. `$argon2id$v=19$m=...`
    Argon2,
    /// Modular crypt, `$2a$`, `$2b$` or `$2y$`
    Bcrypt,
}

impl HashScheme {
    #[must_use]
    pub fn detect(stored: &str) -> Option<Self> {
        if stored.starts_with("$argon2") {
            Some(Self::Argon2)
        } else if ["$2a$", "$2b$", "$2y$"].iter().any(|p| stored.starts_with(p)) {
            Some(Self::Bcrypt)
        } else {
            None
        }
    }
}

/// Hashes new secrets with Argon2id and verifies stored Argon2 or bcrypt hashes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParams`] when argon2 rejects the settings.
    pub fn new(settings: Argon2Settings) -> CryptoResult<Self> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| CryptoError::InvalidParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut filler = [0u8; 32];
        OsRng.fill_bytes(&mut filler);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(&filler, &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash of a random secret nobody knows. Verifying against it costs the
    /// same as a real verification and never succeeds.
    #[must_use]
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// # Errors
    ///
    /// Returns [`CryptoError::Hashing`] if argon2 fails to produce a hash.
    pub fn hash(&self, secret: &str) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CryptoError::Hashing(e.to_string()))
    }

    /// Check `secret` against `stored`. A wrong secret is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// [`CryptoError::UnsupportedScheme`] when `stored` is neither Argon2 nor
    /// bcrypt, [`CryptoError::MalformedHash`] when it claims a scheme but
    /// does not parse.
    pub fn verify_secret(&self, secret: &str, stored: &str) -> CryptoResult<bool> {
        match HashScheme::detect(stored) {
            Some(HashScheme::Argon2) => {
                let parsed = PasswordHash::new(stored)
                    .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;
                match self.argon2.verify_password(secret.as_bytes(), &parsed) {
                    Ok(()) => Ok(true),
                    Err(argon2::password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(CryptoError::MalformedHash(e.to_string())),
                }
            }
            Some(HashScheme::Bcrypt) => bcrypt::verify(secret, stored)
                .map_err(|e| CryptoError::MalformedHash(e.to_string())),
            None => Err(CryptoError::UnsupportedScheme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(Argon2Settings::insecure_fast()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_secret("s3cret", &hash).unwrap());
        assert!(!hasher.verify_secret("S3cret", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = hasher();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_bcrypt_hashes_verify() {
        let stored = bcrypt::hash("legacy-pass", 4).unwrap();
        let hasher = hasher();
        assert!(hasher.verify_secret("legacy-pass", &stored).unwrap());
        assert!(!hasher.verify_secret("other", &stored).unwrap());
    }

    #[test]
    fn test_unknown_scheme() {
        assert_eq!(
            hasher().verify_secret("x", "plaintext"),
            Err(CryptoError::UnsupportedScheme)
        );
    }

    #[test]
    fn test_malformed_argon2() {
        assert!(matches!(
            hasher().verify_secret("x", "$argon2id$garbage"),
            Err(CryptoError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_dummy_hash_rejects() {
        let hasher = hasher();
        assert!(!hasher.verify_secret("", hasher.dummy_hash()).unwrap());
    }

    #[test]
    fn test_invalid_params() {
        let settings = Argon2Settings {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(matches!(
            PasswordHasher::new(settings),
            Err(CryptoError::InvalidParams(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_only_original_secret_verifies(secret in "[ -~]{1,24}", other in "[ -~]{1,24}") {
            let hasher = hasher();
            let hash = hasher.hash(&secret).unwrap();
            prop_assert!(hasher.verify_secret(&secret, &hash).unwrap());
            prop_assert_eq!(hasher.verify_secret(&other, &hash).unwrap(), other == secret);
        }
    }
}
