use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::models::{CredentialRecord, Role};

/// Read access to the per-role identity stores.
///
/// Implementations map their own I/O failures to
/// [`AuthError::StoreUnavailable`](crate::AuthError::StoreUnavailable).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn lookup_credential(&self, role: Role, username: &str)
        -> Result<Option<CredentialRecord>>;
}

/// Credential store held in memory. Useful for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<(Role, String), CredentialRecord>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `(role, record.username)`.
    pub fn insert(&self, role: Role, record: CredentialRecord) {
        self.records
            .write()
            .insert((role, record.username.clone()), record);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup_credential(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Option<CredentialRecord>> {
        Ok(self
            .records
            .read()
            .get(&(role, username.to_string()))
            .cloned())
    }
}
