use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Option<Regex> =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").ok();
    static ref PHONE_REGEX: Option<Regex> =
        Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(?\b[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b").ok();
    static ref LOCAL_PHONE_REGEX: Option<Regex> = Regex::new(r"\b[0-9]{3}-[0-9]{4}\b").ok();
    static ref SSN_REGEX: Option<Regex> = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").ok();
    static ref CREDIT_CARD_REGEX: Option<Regex> =
        Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").ok();
    static ref IP_REGEX: Option<Regex> = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").ok();
    static ref SECRET_REGEX: Option<Regex> =
        Regex::new(r"(?i)\b(password|secret|token)\s*[=:]\s*\S+").ok();
}

/// Which PII classes are scrubbed and how.
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_ssn: bool,
    pub redact_credit_cards: bool,
    pub redact_ip_addresses: bool,
    pub redact_secrets: bool,
    /// Replace matches with a short stable hash instead of a mask so the
    /// same value can be followed across log lines.
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_ssn: true,
            redact_credit_cards: true,
            redact_ip_addresses: true,
            redact_secrets: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionConfig {
    /// A config that leaves every message untouched.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            redact_emails: false,
            redact_phones: false,
            redact_ssn: false,
            redact_credit_cards: false,
            redact_ip_addresses: false,
            redact_secrets: false,
            hash_for_correlation: false,
            custom_patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_custom_pattern(mut self, pattern: Regex, replacement: impl Into<String>) -> Self {
        self.custom_patterns.push((pattern, replacement.into()));
        self
    }
}

/// PII redactor for log messages
#[derive(Debug, Clone, Default)]
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    #[must_use]
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RedactionConfig {
        &self.config
    }

    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_secrets {
            result = self.redact_secrets(&result);
        }

        if self.config.redact_emails {
            result = self.redact_emails(&result);
        }

        // SSN and card numbers run before phones so their digit groups are
        // not partially eaten by the looser phone patterns.
        if self.config.redact_ssn {
            result = self.redact_ssn(&result);
        }

        if self.config.redact_credit_cards {
            result = self.redact_credit_cards(&result);
        }

        if self.config.redact_phones {
            result = self.redact_phones(&result);
        }

        if self.config.redact_ip_addresses {
            result = self.redact_ip_addresses(&result);
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn redact_secrets(&self, text: &str) -> String {
        replace_with(&SECRET_REGEX, text, |caps| {
            let key = caps.get(1).map_or("secret", |m| m.as_str());
            format!("{key}=[REDACTED]")
        })
    }

    fn redact_emails(&self, text: &str) -> String {
        replace_with(&EMAIL_REGEX, text, |caps| {
            let email = whole_match(caps);
            if self.config.hash_for_correlation {
                format!("EMAIL[{}]", hash_value(email))
            } else if let Some((local, domain)) = email.split_once('@') {
                format!("{}***@{}***", first_char(local), first_char(domain))
            } else {
                "***@***".to_string()
            }
        })
    }

    fn redact_phones(&self, text: &str) -> String {
        let masked = replace_with(&PHONE_REGEX, text, |caps| {
            if self.config.hash_for_correlation {
                format!("PHONE[{}]", hash_value(whole_match(caps)))
            } else {
                "(***) ***-****".to_string()
            }
        });
        replace_with(&LOCAL_PHONE_REGEX, &masked, |caps| {
            if self.config.hash_for_correlation {
                format!("PHONE[{}]", hash_value(whole_match(caps)))
            } else {
                "***-****".to_string()
            }
        })
    }

    fn redact_ssn(&self, text: &str) -> String {
        replace_with(&SSN_REGEX, text, |caps| {
            if self.config.hash_for_correlation {
                format!("SSN[{}]", hash_value(whole_match(caps)))
            } else {
                "***-**-****".to_string()
            }
        })
    }

    fn redact_credit_cards(&self, text: &str) -> String {
        replace_with(&CREDIT_CARD_REGEX, text, |caps| {
            if self.config.hash_for_correlation {
                format!("CC[{}]", hash_value(whole_match(caps)))
            } else {
                "****-****-****-****".to_string()
            }
        })
    }

    fn redact_ip_addresses(&self, text: &str) -> String {
        replace_with(&IP_REGEX, text, |caps| {
            let ip = whole_match(caps);
            if self.config.hash_for_correlation {
                return format!("IP[{}]", hash_value(ip));
            }
            let parts: Vec<&str> = ip.split('.').collect();
            match (parts.first(), parts.get(3)) {
                (Some(first), Some(last)) if parts.len() == 4 => format!("{first}.***.***.{last}"),
                _ => "***.***.***.***".to_string(),
            }
        })
    }
}

/// Short, stable digest used to correlate redacted values.
#[must_use]
pub fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let prefix: Vec<u8> = digest.iter().take(8).copied().collect();
    general_purpose::STANDARD.encode(prefix)
}

fn replace_with<F>(regex: &Option<Regex>, text: &str, replacer: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    match regex {
        Some(regex) => regex.replace_all(text, replacer).to_string(),
        None => text.to_string(),
    }
}

fn whole_match<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(0).map_or("", |m| m.as_str())
}

fn first_char(s: &str) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking() -> PiiRedactor {
        PiiRedactor::new(RedactionConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_email_redaction() {
        let redacted = masking().redact("User john.doe@example.com logged in");
        assert!(redacted.contains("j***@e***"));
        assert!(!redacted.contains("john.doe"));
    }

    #[test]
    fn test_phone_redaction() {
        let redacted = masking().redact("Call me at (555) 123-4567");
        assert!(redacted.contains("(***) ***-****"));
    }

    #[test]
    fn test_local_phone_redaction() {
        let redacted = masking().redact("Phone appointment, contact 555-1234");
        assert!(!redacted.contains("555-1234"));
        assert!(redacted.contains("***-****"));
    }

    #[test]
    fn test_timestamps_survive() {
        let text = "scheduled 2025-06-01T10:30:00 at Room 101";
        assert_eq!(masking().redact(text), text);
    }

    #[test]
    fn test_ssn_not_split_by_phone_pattern() {
        let redacted = masking().redact("ssn 123-45-6789");
        assert!(redacted.contains("***-**-****"));
    }

    #[test]
    fn test_secret_redaction() {
        let redacted = masking().redact("login failed password=hunter2 for bob");
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("password=[REDACTED]"));
    }

    #[test]
    fn test_hash_is_stable() {
        let redactor = PiiRedactor::default();
        let a = redactor.redact("mail ann@example.org");
        let b = redactor.redact("mail ann@example.org");
        assert_eq!(a, b);
        assert!(a.starts_with("mail EMAIL["));
    }

    #[test]
    fn test_disabled_passthrough() {
        let redactor = PiiRedactor::new(RedactionConfig::disabled());
        let text = "ann@example.org 555-1234";
        assert_eq!(redactor.redact(text), text);
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = Regex::new(r"SIP-[0-9A-F]{10}").unwrap();
        let redactor = PiiRedactor::new(
            RedactionConfig::disabled().with_custom_pattern(pattern, "SIP-[REDACTED]"),
        );
        assert_eq!(redactor.redact("card SIP-0A1B2C3D4E"), "card SIP-[REDACTED]");
    }
}
