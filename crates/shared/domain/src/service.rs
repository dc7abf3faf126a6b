//! Identity domain service.
//!
//! Cross-aggregate rules that need repository lookups: availability,
//! username generation, MFA secret generation and password scoring.

use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use data_encoding::BASE32;

use crate::constants::{
    FALLBACK_USERNAME_BASE, MAX_USERNAME_LENGTH, MAX_USERNAME_SUFFIX, MFA_SECRET_BYTES,
    STRONG_PASSWORD_SCORE, WEAK_PASSWORD_PATTERNS,
};
use crate::email::Email;
use crate::error::{DomainError, DomainResult};
use crate::password::{validate_password_rules, CharClasses};
use crate::repository::UserRepository;
use crate::username::Username;

/// Advisory password score with improvement hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: i32,
    pub suggestions: Vec<String>,
}

impl PasswordStrength {
    pub fn is_strong(&self) -> bool {
        self.score >= STRONG_PASSWORD_SCORE
    }
}

/// Domain service over the user repository.
#[derive(Clone)]
pub struct IdentityService {
    repo: Arc<dyn UserRepository>,
}

impl IdentityService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// A lookup miss means available. Other lookup errors propagate.
    pub async fn is_email_available(&self, email: &str) -> DomainResult<bool> {
        let email = Email::parse(email)?;
        match self.repo.get_by_email(&email).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// A lookup miss means available. Other lookup errors propagate.
    pub async fn is_username_available(&self, username: &str) -> DomainResult<bool> {
        let username = Username::parse(username)?;
        self.username_free(&username).await
    }

    /// Shape checks first, then email availability, then username.
    ///
    /// This is an early exit only; storage still enforces uniqueness.
    pub async fn validate_user_for_creation(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> DomainResult<()> {
        Email::parse(email)?;
        Username::parse(username)?;
        validate_password_rules(password)?;

        if !self.is_email_available(email).await? {
            return Err(DomainError::conflict("email is already registered"));
        }
        if !self.is_username_available(username).await? {
            return Err(DomainError::conflict("username is already taken"));
        }

        Ok(())
    }

    /// Derive a free username from the user's names.
    ///
    /// Tries the cleaned base, then `base1` through `base999` in order.
    /// The base is shortened when a suffix would push it past 30 chars.
    pub async fn generate_unique_username(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> DomainResult<Username> {
        let base = username_base(first_name, last_name);

        if let Ok(candidate) = Username::parse(&truncate(&base, MAX_USERNAME_LENGTH)) {
            if self.username_free(&candidate).await? {
                return Ok(candidate);
            }
        }

        for n in 1..=MAX_USERNAME_SUFFIX {
            let suffix = n.to_string();
            let stem = truncate(&base, MAX_USERNAME_LENGTH - suffix.len());
            let Ok(candidate) = Username::parse(&format!("{}{}", stem, suffix)) else {
                continue;
            };
            if self.username_free(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(DomainError::Exhausted(
            "unable to generate unique username".to_string(),
        ))
    }

    /// 160 random bits, base32-encoded, for out-of-band MFA enrollment.
    pub fn generate_mfa_secret(&self) -> DomainResult<String> {
        let mut bytes = [0u8; MFA_SECRET_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DomainError::internal(format!("failed to generate MFA secret: {}", e)))?;
        Ok(BASE32.encode(&bytes))
    }

    /// Score a password. Advisory only, never a gate.
    pub fn validate_password_strength(&self, password: &str) -> PasswordStrength {
        let mut score = 0;
        let mut suggestions = Vec::new();

        let len = password.chars().count();
        if len >= 12 {
            score += 2;
        } else if len >= 8 {
            score += 1;
            suggestions.push("Use at least 12 characters".to_string());
        } else {
            suggestions.push("Use at least 8 characters, ideally 12 or more".to_string());
        }

        let classes = CharClasses::of(password);
        let checks = [
            (classes.upper, "Add an uppercase letter"),
            (classes.lower, "Add a lowercase letter"),
            (classes.digit, "Add a number"),
            (classes.special, "Add a special character"),
        ];
        for (present, hint) in checks {
            if present {
                score += 1;
            } else {
                suggestions.push(hint.to_string());
            }
        }

        let lowered = password.to_lowercase();
        if WEAK_PASSWORD_PATTERNS
            .iter()
            .any(|pattern| lowered.contains(pattern))
        {
            score -= 1;
            suggestions.push("Avoid common words and sequences".to_string());
        }

        PasswordStrength { score, suggestions }
    }

    async fn username_free(&self, username: &Username) -> DomainResult<bool> {
        match self.repo.get_by_username(username).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e),
        }
    }
}

/// Lower-cased first+last name with everything but `[a-z0-9]` removed.
fn username_base(first_name: &str, last_name: &str) -> String {
    let base: String = format!("{}{}", first_name, last_name)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    if base.is_empty() {
        FALLBACK_USERNAME_BASE.to_string()
    } else {
        base
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gender::Gender;
    use crate::password::PasswordHash;
    use crate::repository::MockUserRepository;
    use crate::user::{Credentials, Profile, User};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_user() -> User {
        let now = Utc::now();
        User::restore(
            Uuid::new_v4(),
            now,
            now,
            Credentials {
                email: Email::parse("taken@example.com").unwrap(),
                username: Username::parse("taken").unwrap(),
                password_hash: PasswordHash::from_hash("stored-hash").unwrap(),
                email_verified: false,
                mfa_enabled: false,
                mfa_secret: None,
                last_login_at: None,
            },
            Profile {
                first_name: "Taken".into(),
                last_name: "User".into(),
                gender: Gender::Unspecified,
                date_of_birth: None,
                bio: None,
                display_name: None,
                avatar_photo_id: None,
                relationship_id: None,
                locale: "en".into(),
                timezone: "UTC".into(),
            },
        )
    }

    fn service(repo: MockUserRepository) -> IdentityService {
        IdentityService::new(Arc::new(repo))
    }

    #[test]
    fn test_username_base() {
        assert_eq!(username_base("Ada", "Lovelace"), "adalovelace");
        assert_eq!(username_base(" Jean-Luc ", "O'Neil"), "jeanluconeil");
        assert_eq!(username_base("", "Smith"), "smith");
        assert_eq!(username_base("!!", "--"), "user");
    }

    #[tokio::test]
    async fn test_email_available_on_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Err(DomainError::not_found("user")));

        assert!(service(repo).is_email_available("free@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_email_unavailable_on_hit() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(|_| Ok(sample_user()));

        assert!(!service(repo).is_email_available("taken@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_availability() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .returning(|_| Err(DomainError::persistence("connection reset")));

        let err = service(repo).is_username_available("someone").await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_validate_for_creation_reports_email_first() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(|_| Ok(sample_user()));
        repo.expect_get_by_username().never();

        let err = service(repo)
            .validate_user_for_creation("taken@example.com", "taken", "Str0ng!Pass")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::conflict("email is already registered"));
    }

    #[tokio::test]
    async fn test_validate_for_creation_reports_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Err(DomainError::not_found("user")));
        repo.expect_get_by_username().returning(|_| Ok(sample_user()));

        let err = service(repo)
            .validate_user_for_creation("new@example.com", "taken", "Str0ng!Pass")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::conflict("username is already taken"));
    }

    #[tokio::test]
    async fn test_validate_for_creation_rejects_bad_shapes_without_lookups() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().never();
        repo.expect_get_by_username().never();
        let service = service(repo);

        assert!(matches!(
            service.validate_user_for_creation("nope", "alice", "Str0ng!Pass").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.validate_user_for_creation("a@example.com", "alice", "weakpass").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_unique_username_probes_suffixes() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username().returning(|username| {
            if username.as_str() == "adalovelace" {
                Ok(sample_user())
            } else {
                Err(DomainError::not_found("user"))
            }
        });

        let username = service(repo)
            .generate_unique_username("Ada", "Lovelace")
            .await
            .unwrap();
        assert_eq!(username.as_str(), "adalovelace1");
    }

    #[tokio::test]
    async fn test_generate_unique_username_returns_free_base() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .times(1)
            .returning(|_| Err(DomainError::not_found("user")));

        let username = service(repo).generate_unique_username("", "").await.unwrap();
        assert_eq!(username.as_str(), "user");
    }

    #[tokio::test]
    async fn test_generate_unique_username_short_base_uses_suffix() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .returning(|_| Err(DomainError::not_found("user")));

        let username = service(repo).generate_unique_username("Al", "").await.unwrap();
        assert_eq!(username.as_str(), "al1");
    }

    #[tokio::test]
    async fn test_generate_unique_username_long_base_fits_limit() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username().returning(|username| {
            if username.as_str().len() == 30 && !username.as_str().ends_with('1') {
                Ok(sample_user())
            } else {
                Err(DomainError::not_found("user"))
            }
        });

        let first = "a".repeat(40);
        let username = service(repo)
            .generate_unique_username(&first, "")
            .await
            .unwrap();
        assert_eq!(username.as_str(), format!("{}1", "a".repeat(29)));
    }

    #[tokio::test]
    async fn test_generate_unique_username_exhausted() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .times(1000)
            .returning(|_| Ok(sample_user()));

        let err = service(repo)
            .generate_unique_username("Ada", "Lovelace")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Exhausted(_)));
    }

    #[test]
    fn test_mfa_secret_is_160_bit_base32() {
        let service = service(MockUserRepository::new());
        let secret = service.generate_mfa_secret().unwrap();

        assert_eq!(secret.len(), 32);
        assert_eq!(BASE32.decode(secret.as_bytes()).unwrap().len(), 20);
        assert_ne!(secret, service.generate_mfa_secret().unwrap());
    }

    #[test]
    fn test_password_strength_scoring() {
        let service = service(MockUserRepository::new());

        let strong = service.validate_password_strength("C0rrect-Horse!");
        assert_eq!(strong.score, 6);
        assert!(strong.suggestions.is_empty());
        assert!(strong.is_strong());

        let weak = service.validate_password_strength("password123");
        // +1 length, +1 lower, +1 digit, -1 common word
        assert_eq!(weak.score, 2);
        assert!(!weak.is_strong());
        assert!(weak
            .suggestions
            .iter()
            .any(|s| s.contains("common words")));

        let tiny = service.validate_password_strength("ab");
        assert_eq!(tiny.score, 1);
    }
}
