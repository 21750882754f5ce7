//! Implementations for the services the app needs.
//!

mod analytics;
mod auth;
mod bots;
mod conversations;
mod documents;
mod integrations;
mod leads;
mod notifications;
mod responder;
mod subscriptions;

pub use analytics::MyAnalyticsService;
pub use auth::MyAuthService;
pub use bots::MyBotService;
pub use conversations::MyConversationService;
pub use documents::MyDocumentService;
pub use integrations::MyIntegrationService;
pub use leads::MyLeadService;
pub use notifications::MyNotificationService;
pub use responder::MyConversationResponder;
pub use subscriptions::MySubscriptionService;

use crate::core::errors::{ServiceError, ServiceResult};

/// Trims `value` and fails with `field is required` when nothing is left.
pub(crate) fn required(field: &str, value: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(ServiceError::validation(format!("{field} is required")))
    } else {
        Ok(value.to_owned())
    }
}

/// Like [`required`] but keeps the text as given; matching treats surrounding spaces as part
/// of the trigger.
pub(crate) fn verbatim(field: &str, value: String) -> ServiceResult<String> {
    if value.trim().is_empty() {
        Err(ServiceError::validation(format!("{field} is required")))
    } else {
        Ok(value)
    }
}
