//! Password hash value object - Domain layer password handling.
//!
//! Encapsulates Argon2 hashing and the plaintext strength rules.
//! The plaintext never outlives the constructor call.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash as EncodedHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

use crate::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, PASSWORD_SPECIAL_CHARS};
use crate::error::{DomainError, DomainResult};

/// Hashed password value object.
///
/// Immutable, compared by value. Only the encoded Argon2 string is kept.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

/// Check the plaintext rules without hashing.
///
/// Length 8-128 and at least one uppercase, lowercase, digit and special
/// character. Fails on the first violated rule.
pub fn validate_password_rules(plain_text: &str) -> DomainResult<()> {
    if plain_text.is_empty() {
        return Err(DomainError::validation("password is required"));
    }

    let len = plain_text.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "password too long (max {} characters)",
            MAX_PASSWORD_LENGTH
        )));
    }

    let classes = CharClasses::of(plain_text);
    if !classes.upper {
        return Err(DomainError::validation(
            "password must contain at least one uppercase letter",
        ));
    }
    if !classes.lower {
        return Err(DomainError::validation(
            "password must contain at least one lowercase letter",
        ));
    }
    if !classes.digit {
        return Err(DomainError::validation(
            "password must contain at least one number",
        ));
    }
    if !classes.special {
        return Err(DomainError::validation(
            "password must contain at least one special character",
        ));
    }

    Ok(())
}

/// Character classes present in a password.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CharClasses {
    pub upper: bool,
    pub lower: bool,
    pub digit: bool,
    pub special: bool,
}

impl CharClasses {
    pub(crate) fn of(plain_text: &str) -> Self {
        let mut classes = CharClasses::default();
        for c in plain_text.chars() {
            if c.is_ascii_uppercase() {
                classes.upper = true;
            } else if c.is_ascii_lowercase() {
                classes.lower = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else if PASSWORD_SPECIAL_CHARS.contains(c) {
                classes.special = true;
            }
        }
        classes
    }
}

impl PasswordHash {
    /// Validate the plaintext rules and hash it.
    ///
    /// # Errors
    /// Returns a validation error naming the first violated rule.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        validate_password_rules(plain_text)?;
        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Rehydrate from an already-hashed value (from storage).
    ///
    /// Plaintext rules are not re-checked.
    pub fn from_hash(hash: impl Into<String>) -> DomainResult<Self> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(DomainError::validation("password hash cannot be empty"));
        }
        Ok(Self { hash })
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Verify a candidate plaintext against this hash.
    ///
    /// A malformed stored hash and a wrong password both yield `false`.
    pub fn verify(&self, candidate: &str) -> bool {
        match EncodedHash::new(&self.hash) {
            Ok(parsed) => Self::argon2()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    fn hash(plain_text: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "Str0ng!Pass";

    #[test]
    fn test_password_hash_and_verify() {
        let password = PasswordHash::new(STRONG).unwrap();

        assert!(password.verify(STRONG));
        assert!(!password.verify("Str0ng!Pas"));
    }

    #[test]
    fn test_single_character_mutations_fail() {
        let password = PasswordHash::new(STRONG).unwrap();
        for i in 0..STRONG.len() {
            let mut mutated: Vec<u8> = STRONG.bytes().collect();
            mutated[i] = if mutated[i] == b'x' { b'y' } else { b'x' };
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(!password.verify(&mutated), "mutation at {i} verified");
        }
    }

    #[test]
    fn test_password_from_hash() {
        let password = PasswordHash::new(STRONG).unwrap();
        let restored = PasswordHash::from_hash(password.as_str()).unwrap();

        assert!(restored.verify(STRONG));
        assert_eq!(restored, password);
    }

    #[test]
    fn test_from_hash_rejects_blank() {
        assert!(PasswordHash::from_hash("  ").is_err());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let broken = PasswordHash::from_hash("not-an-argon2-hash").unwrap();
        assert!(!broken.verify(STRONG));
        assert!(!broken.verify("not-an-argon2-hash"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let pass1 = PasswordHash::new(STRONG).unwrap();
        let pass2 = PasswordHash::new(STRONG).unwrap();

        // Different salts produce different hashes
        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(STRONG));
        assert!(pass2.verify(STRONG));
    }

    #[test]
    fn test_character_class_rules() {
        let cases = [
            ("str0ng!pass", "uppercase"),
            ("STR0NG!PASS", "lowercase"),
            ("Strong!Pass", "number"),
            ("Str0ngPass1", "special"),
        ];
        for (plain, missing) in cases {
            match PasswordHash::new(plain) {
                Err(DomainError::Validation(msg)) => assert!(msg.contains(missing), "{msg}"),
                other => panic!("expected validation error for {plain}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_length_bounds() {
        assert!(PasswordHash::new("Sh0rt!").is_err());
        assert!(validate_password_rules("Abcdef1!").is_ok());
        let long = format!("Aa1!{}", "x".repeat(125));
        assert!(validate_password_rules(&long).is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = PasswordHash::new(STRONG).unwrap();
        let debug = format!("{:?}", password);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(password.as_str()));
    }
}
