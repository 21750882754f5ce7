//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_owned())
            }
            other => RepositoryError::Database(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<entities::User>>;

    async fn find_by_id(&self, user_id: Uuid) -> RepositoryResult<Option<entities::User>>;

    async fn create_user(&self, user: entities::User) -> RepositoryResult<entities::User>;

    async fn store_refresh_token(
        &self,
        token: entities::RefreshToken,
    ) -> RepositoryResult<entities::RefreshToken>;

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> RepositoryResult<Option<entities::RefreshToken>>;

    /// Returns the number of tokens removed.
    async fn delete_refresh_token(&self, token: &str) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait BotRepository: Send + Sync {
    async fn list_bots(&self, owner_id: Uuid) -> RepositoryResult<Vec<entities::BotWithCounts>>;

    async fn create_bot(&self, bot: entities::Bot) -> RepositoryResult<entities::Bot>;

    async fn find_bot(&self, bot_id: Uuid) -> RepositoryResult<Option<entities::Bot>>;

    async fn find_owned_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
    ) -> RepositoryResult<Option<entities::BotWithCounts>>;

    async fn update_bot(
        &self,
        bot_id: Uuid,
        changes: entities::BotChanges,
    ) -> RepositoryResult<entities::Bot>;

    async fn set_published(&self, bot_id: Uuid, published: bool)
    -> RepositoryResult<entities::Bot>;

    async fn delete_bot(&self, bot_id: Uuid) -> RepositoryResult<()>;

    /// Loads a bot with every intent and FAQ, enabled or not, in creation order.
    async fn load_bot_rules(&self, bot_id: Uuid) -> RepositoryResult<Option<entities::BotRules>>;

    async fn list_intents(&self, bot_id: Uuid) -> RepositoryResult<Vec<entities::Intent>>;

    async fn find_intent(
        &self,
        bot_id: Uuid,
        intent_id: Uuid,
    ) -> RepositoryResult<Option<entities::Intent>>;

    async fn create_intent(&self, intent: entities::Intent) -> RepositoryResult<entities::Intent>;

    async fn update_intent(&self, intent: entities::Intent) -> RepositoryResult<entities::Intent>;

    async fn delete_intent(&self, bot_id: Uuid, intent_id: Uuid) -> RepositoryResult<()>;

    async fn list_faqs(&self, bot_id: Uuid) -> RepositoryResult<Vec<entities::Faq>>;

    async fn find_faq(&self, bot_id: Uuid, faq_id: Uuid)
    -> RepositoryResult<Option<entities::Faq>>;

    async fn create_faq(&self, faq: entities::Faq) -> RepositoryResult<entities::Faq>;

    async fn update_faq(&self, faq: entities::Faq) -> RepositoryResult<entities::Faq>;

    async fn delete_faq(&self, bot_id: Uuid, faq_id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_session(
        &self,
        bot_id: Uuid,
        session_id: &str,
    ) -> RepositoryResult<Option<entities::Conversation>>;

    /// Inserts the conversation unless one already exists for its (bot, session) pair, and
    /// returns whichever row ends up stored.
    async fn create_or_get_conversation(
        &self,
        conversation: entities::Conversation,
    ) -> RepositoryResult<entities::Conversation>;

    async fn list_conversations(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<entities::ConversationWithCount>>;

    async fn find_owned_conversation(
        &self,
        owner_id: Uuid,
        conversation_id: Uuid,
    ) -> RepositoryResult<Option<entities::Conversation>>;

    async fn delete_conversation(&self, conversation_id: Uuid) -> RepositoryResult<()>;

    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> RepositoryResult<Vec<entities::Message>>;

    async fn create_message_in_conversation(
        &self,
        message: entities::Message,
    ) -> RepositoryResult<entities::Message>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn list_documents(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<entities::Document>>;

    async fn create_document(
        &self,
        document: entities::Document,
    ) -> RepositoryResult<entities::Document>;

    async fn find_owned_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> RepositoryResult<Option<entities::Document>>;

    async fn delete_document(&self, document_id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn list_leads(
        &self,
        owner_id: Uuid,
        campaign_id: Option<Uuid>,
        status: Option<entities::LeadStatus>,
    ) -> RepositoryResult<Vec<entities::LeadWithBot>>;

    async fn create_lead(&self, lead: entities::Lead) -> RepositoryResult<entities::Lead>;

    async fn find_owned_lead(
        &self,
        owner_id: Uuid,
        lead_id: Uuid,
    ) -> RepositoryResult<Option<entities::Lead>>;

    async fn update_lead(&self, lead: entities::Lead) -> RepositoryResult<entities::Lead>;

    async fn list_campaigns(&self) -> RepositoryResult<Vec<entities::CampaignWithCount>>;

    async fn find_campaign(
        &self,
        campaign_id: Uuid,
    ) -> RepositoryResult<Option<entities::LeadCampaign>>;

    async fn create_campaign(
        &self,
        campaign: entities::LeadCampaign,
    ) -> RepositoryResult<entities::LeadCampaign>;
}

#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    async fn list_active_integrations(&self) -> RepositoryResult<Vec<entities::Integration>>;

    async fn create_integration(
        &self,
        integration: entities::Integration,
    ) -> RepositoryResult<entities::Integration>;

    async fn find_integration(
        &self,
        integration_id: Uuid,
    ) -> RepositoryResult<Option<entities::Integration>>;

    async fn list_configs(
        &self,
        organization_id: &str,
    ) -> RepositoryResult<Vec<(entities::IntegrationConfig, entities::Integration)>>;

    async fn upsert_config(
        &self,
        organization_id: &str,
        integration_id: Uuid,
        config: Value,
    ) -> RepositoryResult<entities::IntegrationConfig>;

    async fn delete_config(&self, config_id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list_active_plans(&self) -> RepositoryResult<Vec<entities::Plan>>;

    async fn find_plan(&self, plan_id: Uuid) -> RepositoryResult<Option<entities::Plan>>;

    async fn create_plan(&self, plan: entities::Plan) -> RepositoryResult<entities::Plan>;

    async fn latest_subscription(
        &self,
        organization_id: &str,
    ) -> RepositoryResult<Option<entities::Subscription>>;

    async fn create_subscription(
        &self,
        subscription: entities::Subscription,
    ) -> RepositoryResult<entities::Subscription>;

    async fn cancel_subscription(
        &self,
        subscription_id: Uuid,
    ) -> RepositoryResult<entities::Subscription>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> RepositoryResult<Vec<entities::Notification>>;

    async fn count_unread(&self, user_id: Uuid) -> RepositoryResult<i64>;

    async fn create_notification(
        &self,
        notification: entities::Notification,
    ) -> RepositoryResult<entities::Notification>;

    /// Marks one of the user's notifications as read.
    async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> RepositoryResult<entities::Notification>;

    /// Returns the number of notifications that changed.
    async fn mark_all_read(&self, user_id: Uuid) -> RepositoryResult<u64>;
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Creates the counter with value 1 or adds 1 to it, in a single statement.
    async fn increment_counter(
        &self,
        bot_id: Uuid,
        date: NaiveDate,
        metric: &str,
    ) -> RepositoryResult<()>;

    async fn overview(
        &self,
        owner_id: Uuid,
        filter: entities::OverviewFilter,
    ) -> RepositoryResult<entities::OverviewCounts>;

    async fn list_counters(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
        limit: i64,
    ) -> RepositoryResult<Vec<entities::AnalyticsCounter>>;
}
