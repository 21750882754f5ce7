//! DB Repository abstractions

mod analytics;
mod bots;
mod conversations;
mod documents;
mod integrations;
mod leads;
mod notifications;
mod subscriptions;
mod users;

pub use analytics::DbAnalyticsRepository;
pub use bots::DbBotRepository;
pub use conversations::DbConversationRepository;
pub use documents::DbDocumentRepository;
pub use integrations::DbIntegrationRepository;
pub use leads::DbLeadRepository;
pub use notifications::DbNotificationRepository;
pub use subscriptions::DbSubscriptionRepository;
pub use users::DbUserRepository;
