//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Credentials
// =============================================================================

/// Maximum email length in bytes
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Minimum username length
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Characters accepted as the "special" password character class
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

// =============================================================================
// Profile
// =============================================================================

/// Maximum length for first and last names
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum bio length
pub const MAX_BIO_LENGTH: usize = 500;

/// Locale assigned to new profiles
pub const DEFAULT_LOCALE: &str = "en";

/// Timezone assigned to new profiles
pub const DEFAULT_TIMEZONE: &str = "UTC";

// =============================================================================
// Username generation
// =============================================================================

/// Base candidate used when both names are empty after cleaning
pub const FALLBACK_USERNAME_BASE: &str = "user";

/// Highest numeric suffix probed by username generation
pub const MAX_USERNAME_SUFFIX: u32 = 999;

// =============================================================================
// Password strength scoring
// =============================================================================

/// Substrings that lower a password's strength score
pub const WEAK_PASSWORD_PATTERNS: &[&str] = &["password", "123456", "qwerty", "admin", "login"];

/// Score at or above which a password is considered strong
pub const STRONG_PASSWORD_SCORE: i32 = 5;

// =============================================================================
// MFA
// =============================================================================

/// MFA secret size in bytes (160 bits)
pub const MFA_SECRET_BYTES: usize = 20;
