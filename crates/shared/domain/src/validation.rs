//! Profile field rules shared by the aggregate's operations.

use crate::constants::{MAX_BIO_LENGTH, MAX_NAME_LENGTH};
use crate::error::{DomainError, DomainResult};

/// Field labels used in validation messages.
pub const FIRST_NAME_FIELD: &str = "first name";
pub const LAST_NAME_FIELD: &str = "last name";

/// A required name of at most 50 characters. Returns the trimmed value.
pub fn validate_name(name: &str, field: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "{} too long (max {} characters)",
            field, MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// An optional bio of at most 500 characters.
pub fn validate_bio(bio: &str) -> DomainResult<()> {
    if bio.chars().count() > MAX_BIO_LENGTH {
        return Err(DomainError::validation(format!(
            "bio too long (max {} characters)",
            MAX_BIO_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required_and_trimmed() {
        assert_eq!(validate_name("  Ada ", FIRST_NAME_FIELD).unwrap(), "Ada");
        let err = validate_name("  ", LAST_NAME_FIELD).unwrap_err();
        assert_eq!(err, DomainError::validation("last name is required"));
    }

    #[test]
    fn test_name_length() {
        assert!(validate_name(&"a".repeat(50), FIRST_NAME_FIELD).is_ok());
        assert!(validate_name(&"a".repeat(51), FIRST_NAME_FIELD).is_err());
    }

    #[test]
    fn test_bio_length() {
        assert!(validate_bio("").is_ok());
        assert!(validate_bio(&"b".repeat(500)).is_ok());
        assert!(validate_bio(&"b".repeat(501)).is_err());
    }
}
