//! Domain events raised by the `User` aggregate.
//!
//! Events are a closed sum type so publishers can match exhaustively.
//! Payloads never carry password hashes or MFA secrets.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::email::Email;
use crate::username::Username;

pub const USER_CREATED: &str = "user.created";
pub const USER_LOGGED_IN: &str = "user.logged_in";
pub const USER_EMAIL_VERIFIED: &str = "user.email_verified";

/// Fields shared by every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    /// `None` until the aggregate has been persisted.
    pub aggregate_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    fn new(aggregate_id: Option<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Something that happened to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type")]
pub enum DomainEvent {
    #[serde(rename = "user.created")]
    UserCreated {
        #[serde(flatten)]
        meta: EventMetadata,
        email: Email,
        username: Username,
        first_name: String,
        last_name: String,
    },

    /// Empty `ip_address` / `user_agent` mean "unknown".
    #[serde(rename = "user.logged_in")]
    UserLoggedIn {
        #[serde(flatten)]
        meta: EventMetadata,
        email: Email,
        username: Username,
        ip_address: String,
        user_agent: String,
    },

    #[serde(rename = "user.email_verified")]
    UserEmailVerified {
        #[serde(flatten)]
        meta: EventMetadata,
        email: Email,
    },
}

impl DomainEvent {
    pub fn user_created(
        aggregate_id: Option<Uuid>,
        email: Email,
        username: Username,
        first_name: String,
        last_name: String,
    ) -> Self {
        DomainEvent::UserCreated {
            meta: EventMetadata::new(aggregate_id),
            email,
            username,
            first_name,
            last_name,
        }
    }

    pub fn user_logged_in(
        aggregate_id: Option<Uuid>,
        email: Email,
        username: Username,
        ip_address: String,
        user_agent: String,
    ) -> Self {
        DomainEvent::UserLoggedIn {
            meta: EventMetadata::new(aggregate_id),
            email,
            username,
            ip_address,
            user_agent,
        }
    }

    pub fn user_email_verified(aggregate_id: Option<Uuid>, email: Email) -> Self {
        DomainEvent::UserEmailVerified {
            meta: EventMetadata::new(aggregate_id),
            email,
        }
    }

    pub fn meta(&self) -> &EventMetadata {
        match self {
            DomainEvent::UserCreated { meta, .. }
            | DomainEvent::UserLoggedIn { meta, .. }
            | DomainEvent::UserEmailVerified { meta, .. } => meta,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.meta().event_id
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::UserCreated { .. } => USER_CREATED,
            DomainEvent::UserLoggedIn { .. } => USER_LOGGED_IN,
            DomainEvent::UserEmailVerified { .. } => USER_EMAIL_VERIFIED,
        }
    }

    pub fn aggregate_id(&self) -> Option<Uuid> {
        self.meta().aggregate_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.meta().occurred_at
    }

    /// Fill in the aggregate id once storage has assigned one.
    pub(crate) fn stamp_aggregate_id(&mut self, id: Uuid) {
        let meta = match self {
            DomainEvent::UserCreated { meta, .. }
            | DomainEvent::UserLoggedIn { meta, .. }
            | DomainEvent::UserEmailVerified { meta, .. } => meta,
        };
        if meta.aggregate_id.is_none() {
            meta.aggregate_id = Some(id);
        }
    }
}
