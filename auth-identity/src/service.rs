use std::sync::Arc;

use crypto::{CryptoError, PasswordHasher};
use logger_redacted::redacted_warn;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::models::{Credentials, Principal, Role};
use crate::repository::CredentialStore;

/// Resolves a role claim plus credentials into a [`Principal`].
///
/// Stateless: every call reads the identity store and verifies the secret
/// again. The gate never writes to the store.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Authenticate one request.
    ///
    /// Checks run in this order: credentials present, role recognised,
    /// record found, secret verified. An unknown username still pays for a
    /// verification against a dummy hash so it looks like a wrong secret.
    ///
    /// # Errors
    ///
    /// Any [`AuthError`] except `Forbidden`.
    pub async fn authenticate(
        &self,
        role_claim: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<Principal> {
        let result = self.authenticate_inner(role_claim, credentials).await;
        match &result {
            Ok(principal) => debug!(role = %principal.role(), "Authenticated request"),
            Err(AuthError::StoreUnavailable(detail)) => {
                warn!(reason = "store_unavailable", detail = %detail, "Authentication failed");
            }
            Err(e) => debug!(
                role = role_claim.unwrap_or("-"),
                reason = e.kind(),
                "Authentication rejected"
            ),
        }
        result
    }

    async fn authenticate_inner(
        &self,
        role_claim: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<Principal> {
        let credentials = match credentials {
            Some(c) if !c.is_blank() => c,
            _ => return Err(AuthError::MissingCredentials),
        };
        let role: Role = role_claim.ok_or(AuthError::UnknownRole)?.parse()?;

        let record = self
            .store
            .lookup_credential(role, &credentials.username)
            .await?;

        let Some(record) = record else {
            // Spend the same work as a real check before answering.
            let dummy = self.hasher.dummy_hash().to_string();
            let _ = self.verify(&credentials.secret, dummy).await;
            return Err(AuthError::InvalidCredentials);
        };

        match self.verify(&credentials.secret, record.password_hash.clone()).await? {
            Ok(true) => Ok(Principal::new(record.identifier, role)),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                redacted_warn!(
                    { role = %role, identifier = %record.identifier },
                    "Stored password hash for {} is unusable: {}",
                    record.username,
                    e
                );
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Run the CPU-heavy verification off the async workers.
    async fn verify(
        &self,
        secret: &str,
        stored: String,
    ) -> Result<std::result::Result<bool, CryptoError>> {
        let hasher = Arc::clone(&self.hasher);
        let secret = secret.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_secret(&secret, &stored))
            .await
            .map_err(|e| AuthError::StoreUnavailable(format!("verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityConfig;
    use crate::models::CredentialRecord;
    use crate::repository::{InMemoryCredentialStore, MockCredentialStore};
    use proptest::prelude::*;

    fn hasher() -> Arc<PasswordHasher> {
        Arc::new(PasswordHasher::new(IdentityConfig::for_tests().argon2).unwrap())
    }

    fn gate_with(role: Role, username: &str, secret: &str) -> AuthGate {
        let hasher = hasher();
        let store = InMemoryCredentialStore::new();
        store.insert(
            role,
            CredentialRecord {
                identifier: format!("{role}-{username}"),
                username: username.to_string(),
                password_hash: hasher.hash(secret).unwrap(),
            },
        );
        AuthGate::new(Arc::new(store), hasher)
    }

    #[tokio::test]
    async fn test_correct_secret_yields_principal() {
        let gate = gate_with(Role::Patient, "ana", "correct");
        let principal = gate
            .authenticate(Some("patient"), Some(&Credentials::new("ana", "correct")))
            .await
            .unwrap();
        assert_eq!(principal.role(), Role::Patient);
        assert_eq!(principal.identifier(), "patient-ana");
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let gate = gate_with(Role::Patient, "ana", "correct");
        let err = gate
            .authenticate(Some("patient"), Some(&Credentials::new("ana", "wrong")))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_unknown_user_looks_like_wrong_secret() {
        let gate = gate_with(Role::Patient, "ana", "correct");
        let err = gate
            .authenticate(Some("patient"), Some(&Credentials::new("nobody", "correct")))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_role_selects_store() {
        let gate = gate_with(Role::Doctor, "house", "vicodin");
        let err = gate
            .authenticate(Some("nurse"), Some(&Credentials::new("house", "vicodin")))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(gate
            .authenticate(Some("medico"), Some(&Credentials::new("house", "vicodin")))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unusable_stored_hash_is_invalid_credentials() {
        let store = InMemoryCredentialStore::new();
        store.insert(
            Role::Nurse,
            CredentialRecord {
                identifier: "n1".into(),
                username: "joy".into(),
                password_hash: "plaintext-password".into(),
            },
        );
        let gate = AuthGate::new(Arc::new(store), hasher());
        let err = gate
            .authenticate(
                Some("nurse"),
                Some(&Credentials::new("joy", "plaintext-password")),
            )
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_unknown_role_never_touches_store() {
        let mut store = MockCredentialStore::new();
        store.expect_lookup_credential().never();
        let gate = AuthGate::new(Arc::new(store), hasher());

        let err = gate
            .authenticate(Some("admin"), Some(&Credentials::new("x", "y")))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnknownRole);

        let err = gate
            .authenticate(None, Some(&Credentials::new("x", "y")))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnknownRole);
    }

    #[tokio::test]
    async fn test_missing_credentials_checked_before_role() {
        let mut store = MockCredentialStore::new();
        store.expect_lookup_credential().never();
        let gate = AuthGate::new(Arc::new(store), hasher());

        assert_eq!(
            gate.authenticate(Some("admin"), None).await.unwrap_err(),
            AuthError::MissingCredentials
        );
        assert_eq!(
            gate.authenticate(Some("patient"), Some(&Credentials::new("", "")))
                .await
                .unwrap_err(),
            AuthError::MissingCredentials
        );
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_unavailable() {
        let mut store = MockCredentialStore::new();
        store
            .expect_lookup_credential()
            .withf(|role, username| *role == Role::Doctor && username == "house")
            .times(1)
            .returning(|_, _| Err(AuthError::StoreUnavailable("connection reset".into())));
        let gate = AuthGate::new(Arc::new(store), hasher());

        let err = gate
            .authenticate(Some("doctor"), Some(&Credentials::new("house", "x")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_principal_matches_record(
            role in prop::sample::select(Role::ALL.to_vec()),
            username in "[a-z]{1,12}",
            secret in "[A-Za-z0-9]{1,16}",
        ) {
            let gate = gate_with(role, &username, &secret);
            let principal = runtime()
                .block_on(gate.authenticate(Some(role.as_str()), Some(&Credentials::new(username.clone(), secret))))
                .unwrap();
            prop_assert_eq!(principal.role(), role);
            let expected = format!("{role}-{username}");
            prop_assert_eq!(principal.identifier(), expected.as_str());
        }

        #[test]
        fn prop_wrong_secret_never_authenticates(
            username in "[a-z]{1,12}",
            attempted in "[a-z]{1,12}",
            secret in "[A-Za-z0-9]{1,16}",
            wrong in "[A-Za-z0-9]{1,16}",
        ) {
            prop_assume!(secret != wrong);
            let gate = gate_with(Role::Patient, &username, &secret);
            let err = runtime()
                .block_on(gate.authenticate(Some("patient"), Some(&Credentials::new(attempted, wrong))))
                .unwrap_err();
            prop_assert_eq!(err, AuthError::InvalidCredentials);
        }
    }
}
