use std::sync::Arc;
use std::time::Instant;

use appointment_engine::AppointmentManager;
use auth_identity::{AuthGate, IdentityConfig};
use crypto::{IdGenerator, PasswordHasher, RandomIdGenerator};
use database_layer::{
    InMemoryRecordStore, PgRecordStore, RecordCredentialStore, RecordStore, StaffKind, StaffMember,
};
use error_common::{HospitalError, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::services::{RecordPatientDirectory, RxNormClient};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HospitalServer {
    pub config: Arc<ServerConfig>,
    pub records: Arc<dyn RecordStore>,
    pub gate: AuthGate,
    pub appointments: Arc<AppointmentManager>,
    pub hasher: Arc<PasswordHasher>,
    pub ids: Arc<dyn IdGenerator>,
    pub rxnorm: RxNormClient,
    /// Present only with the PostgreSQL backend.
    pub pool: Option<PgPool>,
    started_at: Instant,
}

impl HospitalServer {
    /// Build the state, connecting to PostgreSQL when a database URL is
    /// configured and falling back to the in-memory store otherwise.
    ///
    /// # Errors
    ///
    /// Connection, schema or hasher set-up failures.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        match config.database.url.clone() {
            Some(url) => {
                let pool = database_layer::connect(&url, config.database.max_connections)
                    .await
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;
                let store = PgRecordStore::new(pool.clone());
                store
                    .ensure_schema()
                    .await
                    .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;
                info!("Using PostgreSQL record store");
                Self::assemble(config, Arc::new(store), Some(pool))
            }
            None => {
                warn!("No database URL configured, records live in memory only");
                Self::with_store(config, Arc::new(InMemoryRecordStore::new()))
            }
        }
    }

    /// Build the state around an existing record store.
    ///
    /// # Errors
    ///
    /// Invalid Argon2 settings or an HTTP client that cannot be built.
    pub fn with_store(config: ServerConfig, records: Arc<dyn RecordStore>) -> Result<Self> {
        Self::assemble(config, records, None)
    }

    fn assemble(
        config: ServerConfig,
        records: Arc<dyn RecordStore>,
        pool: Option<PgPool>,
    ) -> Result<Self> {
        let hasher = Arc::new(
            PasswordHasher::new(config.identity.argon2)
                .map_err(|e| HospitalError::ConfigError(e.to_string()))?,
        );
        let gate = AuthGate::new(
            Arc::new(RecordCredentialStore::new(Arc::clone(&records))),
            Arc::clone(&hasher),
        );
        let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator);
        let appointments = Arc::new(AppointmentManager::new(
            Arc::new(RecordPatientDirectory::new(Arc::clone(&records))),
            Arc::clone(&ids),
        ));
        let rxnorm = RxNormClient::new(&config.rxnorm)
            .map_err(|e| HospitalError::ConfigError(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            records,
            gate,
            appointments,
            hasher,
            ids,
            rxnorm,
            pool,
            started_at: Instant::now(),
        })
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityConfig {
        &self.config.identity
    }

    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Use `requested` when given and not blank, otherwise mint a new id.
    #[must_use]
    pub fn id_or_generate(&self, requested: Option<String>) -> String {
        requested
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.ids.generate_id())
    }

    /// Enforce the password policy and hash off the async runtime.
    ///
    /// # Errors
    ///
    /// 400 for a too-short password, 500 if hashing fails.
    pub async fn hash_password(&self, password: &str) -> std::result::Result<String, ApiError> {
        self.identity()
            .check_password(password)
            .map_err(|message| ApiError::invalid_field("password", message))?;

        let hasher = Arc::clone(&self.hasher);
        let secret = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .map_err(ApiError::from)
    }

    /// Create the configured bootstrap doctor unless that username exists.
    ///
    /// # Errors
    ///
    /// Store failures, or a bootstrap password that fails the policy.
    pub async fn bootstrap_doctor(&self) -> Result<()> {
        let bootstrap = &self.config.bootstrap;
        let (Some(username), Some(password)) = (
            bootstrap.doctor_username.as_deref(),
            bootstrap.doctor_password.as_deref(),
        ) else {
            return Ok(());
        };

        let existing = self
            .records
            .find_credential(StaffKind::Doctor.role(), username)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;
        if existing.is_some() {
            info!(username = %username, "Bootstrap doctor already present");
            return Ok(());
        }

        let password_hash = self
            .hash_password(password)
            .await
            .map_err(|e| HospitalError::ConfigError(format!("bootstrap doctor: {e}")))?;
        let doctor = StaffMember {
            id: self.ids.generate_id(),
            username: username.to_string(),
            password_hash,
            specialty: "general".to_string(),
            seniority_years: 0,
        };
        self.records
            .insert_staff(StaffKind::Doctor, doctor)
            .await
            .map_err(|e| HospitalError::DatabaseError(e.to_string()))?;
        info!(username = %username, "Bootstrap doctor created");
        Ok(())
    }
}
