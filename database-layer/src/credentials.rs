use std::sync::Arc;

use async_trait::async_trait;
use auth_identity::{AuthError, CredentialRecord, CredentialStore, Role};

use crate::repository::RecordStore;

/// Serves the auth gate's identity lookups from a [`RecordStore`].
#[derive(Clone)]
pub struct RecordCredentialStore {
    records: Arc<dyn RecordStore>,
}

impl RecordCredentialStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CredentialStore for RecordCredentialStore {
    async fn lookup_credential(
        &self,
        role: Role,
        username: &str,
    ) -> auth_identity::Result<Option<CredentialRecord>> {
        self.records
            .find_credential(role, username)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))
    }
}
