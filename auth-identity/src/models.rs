use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// The three identity stores a request can authenticate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Nurse,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Patient, Role::Doctor, Role::Nurse];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Accepts the English names and the legacy Spanish ones, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" | "paciente" => Ok(Self::Patient),
            "doctor" | "medico" | "médico" => Ok(Self::Doctor),
            "nurse" | "enfermero" | "enfermera" => Ok(Self::Nurse),
            _ => Err(AuthError::UnknownRole),
        }
    }
}

/// Authenticated identity for the lifetime of one request.
///
/// Only the gate creates these; there is no public constructor outside tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    identifier: String,
    role: Role,
}

impl Principal {
    pub(crate) fn new(identifier: String, role: Role) -> Self {
        Self { identifier, role }
    }

    /// Build a principal without authenticating. Test fixtures only.
    #[doc(hidden)]
    #[must_use]
    pub fn for_tests(identifier: impl Into<String>, role: Role) -> Self {
        Self::new(identifier.into(), role)
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Per-endpoint authorization check.
    ///
    /// # Errors
    ///
    /// [`AuthError::Forbidden`] when this principal's role is not in `allowed`.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// A row of an identity store as the gate needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub identifier: String,
    pub username: String,
    pub password_hash: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("identifier", &self.identifier)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Username and secret as presented by the caller.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.username.trim().is_empty() || self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
