//! Logging macros that run the formatted message through the global redactor.
//!
//! Structured fields go in a leading brace group and are passed to `tracing`
//! untouched, so only put non-sensitive identifiers there:
//!
//! ```ignore
//! redacted_info!({ appointment_id = %id }, "Appointment booked: {}", summary);
//! redacted_warn!("Stored hash for {} is unreadable", username);
//! ```

#[macro_export]
macro_rules! redacted_info {
    ({ $($fields:tt)* }, $($arg:tt)+) => {
        ::tracing::info!($($fields)*, "{}", $crate::redact(&format!($($arg)+)))
    };
    ($($arg:tt)+) => {
        ::tracing::info!("{}", $crate::redact(&format!($($arg)+)))
    };
}

#[macro_export]
macro_rules! redacted_warn {
    ({ $($fields:tt)* }, $($arg:tt)+) => {
        ::tracing::warn!($($fields)*, "{}", $crate::redact(&format!($($arg)+)))
    };
    ($($arg:tt)+) => {
        ::tracing::warn!("{}", $crate::redact(&format!($($arg)+)))
    };
}

#[macro_export]
macro_rules! redacted_error {
    ({ $($fields:tt)* }, $($arg:tt)+) => {
        ::tracing::error!($($fields)*, "{}", $crate::redact(&format!($($arg)+)))
    };
    ($($arg:tt)+) => {
        ::tracing::error!("{}", $crate::redact(&format!($($arg)+)))
    };
}
