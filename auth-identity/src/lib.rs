//! The authentication gate of the hospital engine.
//!
//! A request carries a role claim (`patient`, `doctor` or `nurse`) and a
//! username/secret pair. [`AuthGate::authenticate`] looks the username up in
//! the identity store for that role, verifies the secret against the stored
//! hash and returns a request-scoped [`Principal`]. Handlers then call
//! [`Principal::require_any`] with the roles they admit.
//!
//! ```rust,ignore
//! let gate = AuthGate::new(store, hasher);
//! let principal = gate
//!     .authenticate(Some("doctor"), Some(&Credentials::new("house", "secret")))
//!     .await?;
//! principal.require_any(&[Role::Doctor, Role::Nurse])?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use config::IdentityConfig;
pub use error::{AuthError, Result};
pub use models::{CredentialRecord, Credentials, Principal, Role};
pub use repository::{CredentialStore, InMemoryCredentialStore};
pub use service::AuthGate;
