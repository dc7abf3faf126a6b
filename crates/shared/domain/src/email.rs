//! Email value object.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_EMAIL_LENGTH;
use crate::error::{DomainError, DomainResult};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email pattern compiles")
});

/// Normalized (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalize and validate an email address.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let email = raw.trim().to_lowercase();

        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(DomainError::validation(format!(
                "email too long (max {} characters)",
                MAX_EMAIL_LENGTH
            )));
        }
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let email = Email::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_equality_is_by_value() {
        assert_eq!(
            Email::parse("bob@example.com").unwrap(),
            Email::parse("BOB@example.com").unwrap()
        );
    }

    #[test]
    fn test_email_required() {
        let err = Email::parse("   ").unwrap_err();
        assert_eq!(err, DomainError::validation("email is required"));
    }

    #[test]
    fn test_email_invalid_format() {
        for raw in ["alice", "alice@", "@example.com", "alice@example", "a b@example.com"] {
            assert!(Email::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_email_too_long() {
        let raw = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(Email::parse(&raw), Err(DomainError::Validation(msg)) if msg.contains("too long")));
    }
}
