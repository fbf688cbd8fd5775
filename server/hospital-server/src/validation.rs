//! Request validation shared by the registration handlers.
//!
//! Request types implement [`RequestValidation`]; the macros return a 400
//! naming the offending field.
//!
//! ```rust,ignore
//! impl RequestValidation for CreateRoomRequest {
//!     fn validate(&self) -> Result<(), ApiError> {
//!         validate_field!("capacity", self.capacity > 0, "capacity must be positive");
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::ApiError;

pub trait RequestValidation {
    /// # Errors
    ///
    /// A validation [`ApiError`] for the first field that fails.
    fn validate(&self) -> Result<(), ApiError>;
}

/// Fail with a field-specific 400 unless `$predicate` holds.
#[macro_export]
macro_rules! validate_field {
    ($field:literal, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::invalid_field($field, $message));
        }
    };
}

/// Fail unless the string is non-blank.
#[macro_export]
macro_rules! validate_required {
    ($value:expr, $field:literal) => {
        $crate::validate_field!(
            $field,
            !$value.trim().is_empty(),
            concat!($field, " is required")
        );
    };
}
