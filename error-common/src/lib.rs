//! Common error handling utilities for the hospital engine
//!
//! Two things live here:
//!
//! - **`HospitalError`**: process-level failures (configuration, bind, serve)
//!   used by the server binary.
//! - **Error codes**: stable machine-readable codes for every member of the
//!   request error taxonomy (authentication, authorization, validation,
//!   appointment lifecycle, storage). The HTTP boundary puts one of these in
//!   every error body so clients never have to parse messages.
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, HospitalError};
//!
//! fn check_port(port: u16) -> Result<u16, HospitalError> {
//!     if port == 0 {
//!         return Err(HospitalError::ConfigError("port must be non-zero".into()));
//!     }
//!     Ok(port)
//! }
//!
//! assert!(check_port(0).is_err());
//! assert_eq!(codes::authentication::INVALID_CREDENTIALS, "AUTH_2002");
//! ```

pub mod codes;
pub mod types;

pub use types::*;
