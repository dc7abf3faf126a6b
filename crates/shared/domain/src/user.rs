//! User aggregate root and its child entities.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::constants::{DEFAULT_LOCALE, DEFAULT_TIMEZONE};
use crate::email::Email;
use crate::error::{DomainError, DomainResult};
use crate::events::DomainEvent;
use crate::gender::Gender;
use crate::password::PasswordHash;
use crate::username::Username;
use crate::validation::{validate_bio, validate_name, FIRST_NAME_FIELD, LAST_NAME_FIELD};

/// Login credentials owned by a user.
///
/// Email and username uniqueness is enforced by the domain service and the
/// storage layer, not here.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: Email,
    pub username: Username,
    pub password_hash: PasswordHash,
    pub email_verified: bool,
    pub mfa_enabled: bool,
    pub mfa_secret: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &self.password_hash)
            .field("email_verified", &self.email_verified)
            .field("mfa_enabled", &self.mfa_enabled)
            .field("mfa_secret", &self.mfa_secret.as_ref().map(|_| "[REDACTED]"))
            .field("last_login_at", &self.last_login_at)
            .finish()
    }
}

/// Public-facing profile owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub bio: Option<String>,
    pub display_name: Option<String>,
    pub avatar_photo_id: Option<Uuid>,
    pub relationship_id: Option<Uuid>,
    pub locale: String,
    pub timezone: String,
}

/// User aggregate root.
///
/// The id is assigned by the repository on first save. Pending events live
/// only for the current unit of work and are never persisted.
#[derive(Debug, Clone)]
pub struct User {
    id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    credentials: Credentials,
    profile: Profile,
    events: Vec<DomainEvent>,
}

impl User {
    /// Validate all inputs, hash the password and raise `UserCreated`.
    ///
    /// Fails with the first violated rule, checked in argument order.
    pub fn new(
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> DomainResult<Self> {
        let email = Email::parse(email)?;
        let username = Username::parse(username)?;
        let first_name = validate_name(first_name, FIRST_NAME_FIELD)?;
        let last_name = validate_name(last_name, LAST_NAME_FIELD)?;
        let password_hash = PasswordHash::new(password)?;

        let now = Utc::now();
        let mut user = Self {
            id: None,
            created_at: now,
            updated_at: now,
            credentials: Credentials {
                email,
                username,
                password_hash,
                email_verified: false,
                mfa_enabled: false,
                mfa_secret: None,
                last_login_at: None,
            },
            profile: Profile {
                first_name,
                last_name,
                gender: Gender::Unspecified,
                date_of_birth: None,
                bio: None,
                display_name: None,
                avatar_photo_id: None,
                relationship_id: None,
                locale: DEFAULT_LOCALE.to_string(),
                timezone: DEFAULT_TIMEZONE.to_string(),
            },
            events: Vec::new(),
        };

        user.raise(DomainEvent::user_created(
            None,
            user.credentials.email.clone(),
            user.credentials.username.clone(),
            user.profile.first_name.clone(),
            user.profile.last_name.clone(),
        ));

        Ok(user)
    }

    /// Rebuild a persisted user. The event buffer starts empty.
    pub fn restore(
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        credentials: Credentials,
        profile: Profile,
    ) -> Self {
        Self {
            id: Some(id),
            created_at,
            updated_at,
            credentials,
            profile,
            events: Vec::new(),
        }
    }

    /// Called by repositories on first save.
    ///
    /// Events raised before the id existed are stamped with it.
    pub fn assign_id(&mut self, id: Uuid) -> DomainResult<()> {
        if let Some(existing) = self.id {
            return Err(DomainError::internal(format!(
                "user already has id {}",
                existing
            )));
        }
        self.id = Some(id);
        for event in &mut self.events {
            event.stamp_aggregate_id(id);
        }
        Ok(())
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn email(&self) -> &Email {
        &self.credentials.email
    }

    pub fn username(&self) -> &Username {
        &self.credentials.username
    }

    /// Replace the password after checking the current one.
    pub fn change_password(&mut self, current: &str, new: &str) -> DomainResult<()> {
        if !self.credentials.password_hash.verify(current) {
            return Err(DomainError::authorization("current password is incorrect"));
        }
        self.credentials.password_hash = PasswordHash::new(new)?;
        self.touch();
        Ok(())
    }

    /// Overwrite the editable profile fields.
    ///
    /// An empty `bio` leaves the stored bio untouched; use [`User::clear_bio`]
    /// to remove it.
    pub fn update_profile(
        &mut self,
        first_name: &str,
        last_name: &str,
        bio: &str,
        gender: Gender,
    ) -> DomainResult<()> {
        let first_name = validate_name(first_name, FIRST_NAME_FIELD)?;
        let last_name = validate_name(last_name, LAST_NAME_FIELD)?;
        validate_bio(bio)?;

        self.profile.first_name = first_name;
        self.profile.last_name = last_name;
        if !bio.is_empty() {
            self.profile.bio = Some(bio.to_string());
        }
        self.profile.gender = gender;
        self.touch();
        Ok(())
    }

    pub fn clear_bio(&mut self) {
        if self.profile.bio.take().is_some() {
            self.touch();
        }
    }

    /// Record a successful login and raise `UserLoggedIn`.
    pub fn record_login(&mut self, ip_address: &str, user_agent: &str) {
        let now = Utc::now();
        self.credentials.last_login_at = Some(now);
        self.updated_at = now;
        self.raise(DomainEvent::user_logged_in(
            self.id,
            self.credentials.email.clone(),
            self.credentials.username.clone(),
            ip_address.to_string(),
            user_agent.to_string(),
        ));
    }

    pub fn verify_email(&mut self) {
        self.credentials.email_verified = true;
        self.touch();
        self.raise(DomainEvent::user_email_verified(
            self.id,
            self.credentials.email.clone(),
        ));
    }

    /// Store a generated MFA secret. MFA stays disabled until enrollment.
    pub fn set_mfa_secret(&mut self, secret: String) {
        self.credentials.mfa_secret = Some(secret);
        self.touch();
    }

    /// Pending events, oldest first. Does not clear them.
    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Drain pending events: returns them and leaves the buffer empty.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
