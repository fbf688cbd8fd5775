use thiserror::Error;

/// Reasons a request does not get a [`Principal`](crate::Principal).
///
/// The messages are what callers see; they never say whether the username
/// or the secret was wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unknown role")]
    UnknownRole,

    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden")]
    Forbidden,

    /// Identity store could not be read. The detail is for logs only.
    #[error("Identity store unavailable")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Short tag for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownRole => "unknown_role",
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Forbidden => "forbidden",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
