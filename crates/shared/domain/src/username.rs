//! Username value object.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::{DomainError, DomainResult};

/// Trimmed username of 3-30 characters from `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let username = raw.trim();

        if username.is_empty() {
            return Err(DomainError::validation("username is required"));
        }

        let len = username.chars().count();
        if len < MIN_USERNAME_LENGTH {
            return Err(DomainError::validation(format!(
                "username must be at least {} characters",
                MIN_USERNAME_LENGTH
            )));
        }
        if len > MAX_USERNAME_LENGTH {
            return Err(DomainError::validation(format!(
                "username too long (max {} characters)",
                MAX_USERNAME_LENGTH
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::validation(
                "username can only contain letters, numbers, and underscores",
            ));
        }

        Ok(Self(username.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Username::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_trimmed() {
        assert_eq!(Username::parse("  alice_123 ").unwrap().as_str(), "alice_123");
    }

    #[test]
    fn test_username_length_bounds() {
        assert!(Username::parse("ab").is_err());
        assert!(Username::parse("abc").is_ok());
        assert!(Username::parse(&"a".repeat(30)).is_ok());
        assert!(Username::parse(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_username_charset() {
        assert!(Username::parse("alice.smith").is_err());
        assert!(Username::parse("alice-smith").is_err());
        assert!(Username::parse("alice@example.com").is_err());
        assert!(Username::parse("Alice_Smith9").is_ok());
    }

    #[test]
    fn test_username_is_case_sensitive() {
        assert_ne!(Username::parse("Alice").unwrap(), Username::parse("alice").unwrap());
    }
}
