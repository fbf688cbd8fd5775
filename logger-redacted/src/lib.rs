//! Log setup for the hospital engine with automatic PII redaction.
//!
//! Messages written through [`redacted_info!`], [`redacted_warn!`] and
//! [`redacted_error!`] are scrubbed of e-mail addresses, phone numbers,
//! SSNs, card numbers, IP addresses and `password=`-style secrets before
//! they reach the subscriber. The active redactor is process-wide and is
//! replaced by [`init_tracing`] according to [`LoggerConfig`].

pub mod config;
pub mod init;
pub mod macros;
pub mod redactor;

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

pub use config::LoggerConfig;
pub use init::{init_tracing, LoggerError};
pub use redactor::{hash_value, PiiRedactor, RedactionConfig};

lazy_static! {
    static ref GLOBAL_REDACTOR: RwLock<Arc<PiiRedactor>> =
        RwLock::new(Arc::new(PiiRedactor::default()));
}

/// Replace the process-wide redactor.
pub fn install_redactor(redactor: PiiRedactor) {
    *GLOBAL_REDACTOR.write() = Arc::new(redactor);
}

/// Redact `text` with the process-wide redactor.
#[must_use]
pub fn redact(text: &str) -> String {
    let redactor = Arc::clone(&GLOBAL_REDACTOR.read());
    redactor.redact(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_global_redactor_scrubs_emails() {
        let out = redact("contact ann@example.org");
        assert!(!out.contains("ann@example.org"));
    }

    #[test]
    fn macros_expand() {
        let id = "a1";
        redacted_info!({ appointment_id = %id }, "booked for {}", "bob@example.org");
        redacted_warn!("plain {}", 1);
        redacted_error!({ code = 7 }, "failed");
    }
}
