//! Application use cases.

mod authenticate_user;
mod create_user;

pub use authenticate_user::AuthenticateUser;
pub use create_user::CreateUser;

use tracing::{debug, error};

use domain::User;

use crate::deadline::Deadline;
use crate::ports::EventPublisher;

/// Drain the user's pending events and hand them to the publisher.
///
/// Publishing is best-effort. The buffer is emptied whatever the outcome.
pub(crate) async fn publish_pending_events(
    publisher: &dyn EventPublisher,
    deadline: &Deadline,
    user: &mut User,
) {
    let events = user.take_events();
    if events.is_empty() {
        return;
    }

    let user_id = user.id();
    match deadline.run("publish_events", publisher.publish(&events)).await {
        Ok(()) => debug!(
            user_id = ?user_id,
            event_count = events.len(),
            "Published domain events"
        ),
        Err(e) => error!(
            user_id = ?user_id,
            event_count = events.len(),
            error = %e,
            "Failed to publish domain events"
        ),
    }
}
