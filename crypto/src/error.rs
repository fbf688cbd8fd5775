use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Unsupported hash scheme")]
    UnsupportedScheme,

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
