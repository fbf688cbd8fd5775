//! Password hashing and identifier generation.
//!
//! New secrets are hashed with Argon2id. Verification also accepts bcrypt
//! hashes so accounts migrated from older deployments keep working.

pub mod error;
pub mod ids;
pub mod password;

pub use error::{CryptoError, CryptoResult};
pub use ids::{random_upper_hex, IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use password::{Argon2Settings, HashScheme, PasswordHasher};
