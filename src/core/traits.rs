//! DI "Interfaces"

use crate::core::errors::ServiceResult;
use crate::core::models::{
    AuthSession, ChatReply, ChatRequest, FaqChanges, FaqDraft, IntentChanges, IntentDraft,
    LeadChanges, LoginAttempt, NewBot, NewCampaign, NewIntegration, NewLead, NewPlan,
    Registration, UploadedFile,
};
use crate::infrastructure::entities;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and signs it in.
    ///
    /// Returns `Conflict` if the email is already registered.
    async fn register(&self, registration: Registration) -> ServiceResult<AuthSession>;

    /// Returns `Unauthorized` for an unknown email and for a wrong password alike.
    async fn login(&self, attempt: LoginAttempt) -> ServiceResult<AuthSession>;

    /// Exchanges a stored refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> ServiceResult<String>;

    /// Forgets the refresh token so it can no longer be exchanged.
    async fn logout(&self, refresh_token: Option<&str>) -> ServiceResult<()>;

    async fn me(&self, user_id: Uuid) -> ServiceResult<entities::User>;
}

/// Bot management for the bot's owner. Bots owned by someone else are reported as missing.
#[async_trait]
pub trait BotService: Send + Sync {
    async fn list_bots(&self, owner_id: Uuid) -> ServiceResult<Vec<entities::BotWithCounts>>;

    async fn create_bot(&self, owner_id: Uuid, bot: NewBot) -> ServiceResult<entities::Bot>;

    async fn get_bot(&self, owner_id: Uuid, bot_id: Uuid)
    -> ServiceResult<entities::BotWithCounts>;

    async fn update_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        changes: entities::BotChanges,
    ) -> ServiceResult<entities::Bot>;

    async fn delete_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<()>;

    /// Makes the bot reachable through the public chat endpoint and tells its owner.
    async fn publish_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<entities::Bot>;

    async fn unpublish_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<entities::Bot>;

    async fn list_intents(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
    ) -> ServiceResult<Vec<entities::Intent>>;

    async fn create_intent(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        draft: IntentDraft,
    ) -> ServiceResult<entities::Intent>;

    async fn update_intent(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        intent_id: Uuid,
        changes: IntentChanges,
    ) -> ServiceResult<entities::Intent>;

    async fn delete_intent(&self, owner_id: Uuid, bot_id: Uuid, intent_id: Uuid)
    -> ServiceResult<()>;

    async fn list_faqs(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<Vec<entities::Faq>>;

    async fn create_faq(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        draft: FaqDraft,
    ) -> ServiceResult<entities::Faq>;

    async fn update_faq(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        faq_id: Uuid,
        changes: FaqChanges,
    ) -> ServiceResult<entities::Faq>;

    async fn delete_faq(&self, owner_id: Uuid, bot_id: Uuid, faq_id: Uuid) -> ServiceResult<()>;
}

/// Answers messages sent to published bots.
#[async_trait]
pub trait ConversationResponder: Send + Sync {
    /// Logs the inbound message, picks a reply from the bot's intents and FAQs, and logs the
    /// reply in the session's conversation.
    ///
    /// Returns `NotFound` without writing anything if the bot does not exist or is not
    /// published.
    async fn respond(&self, request: ChatRequest) -> ServiceResult<ChatReply>;

    /// Public view of a published bot, for embeddable widgets.
    async fn bot_config(&self, bot_id: Uuid) -> ServiceResult<entities::Bot>;
}

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Lists the owner's conversations, newest first.
    async fn list_conversations(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> ServiceResult<Vec<entities::ConversationWithCount>>;

    /// Returns a conversation with its messages in chronological order.
    async fn get_conversation(
        &self,
        owner_id: Uuid,
        conversation_id: Uuid,
    ) -> ServiceResult<(entities::Conversation, Vec<entities::Message>)>;

    async fn delete_conversation(&self, owner_id: Uuid, conversation_id: Uuid)
    -> ServiceResult<()>;
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn list_documents(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> ServiceResult<Vec<entities::Document>>;

    /// Stores the file, extracts its text and records it against the bot.
    async fn upload_document(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        file: UploadedFile,
    ) -> ServiceResult<entities::Document>;

    async fn delete_document(&self, owner_id: Uuid, document_id: Uuid) -> ServiceResult<()>;
}

#[async_trait]
pub trait LeadService: Send + Sync {
    async fn list_leads(
        &self,
        owner_id: Uuid,
        campaign_id: Option<Uuid>,
        status: Option<entities::LeadStatus>,
    ) -> ServiceResult<Vec<entities::LeadWithBot>>;

    async fn create_lead(&self, owner_id: Uuid, lead: NewLead) -> ServiceResult<entities::Lead>;

    async fn update_lead(
        &self,
        owner_id: Uuid,
        lead_id: Uuid,
        changes: LeadChanges,
    ) -> ServiceResult<entities::Lead>;

    async fn list_campaigns(&self) -> ServiceResult<Vec<entities::CampaignWithCount>>;

    async fn create_campaign(&self, campaign: NewCampaign)
    -> ServiceResult<entities::LeadCampaign>;
}

#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn list_plans(&self) -> ServiceResult<Vec<entities::Plan>>;

    async fn create_plan(&self, plan: NewPlan) -> ServiceResult<entities::Plan>;

    /// Latest subscription of the organization together with its plan, if any.
    async fn current_subscription(
        &self,
        organization_id: &str,
    ) -> ServiceResult<Option<(entities::Subscription, entities::Plan)>>;

    async fn subscribe(
        &self,
        organization_id: &str,
        plan_id: Uuid,
    ) -> ServiceResult<entities::Subscription>;

    /// Keeps the subscription running until the end of the paid period.
    async fn cancel(&self, subscription_id: Uuid) -> ServiceResult<entities::Subscription>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list_notifications(&self, user_id: Uuid)
    -> ServiceResult<Vec<entities::Notification>>;

    async fn unread_count(&self, user_id: Uuid) -> ServiceResult<i64>;

    async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> ServiceResult<entities::Notification>;

    async fn mark_all_read(&self, user_id: Uuid) -> ServiceResult<u64>;
}

#[async_trait]
pub trait IntegrationService: Send + Sync {
    async fn list_integrations(&self) -> ServiceResult<Vec<entities::Integration>>;

    async fn create_integration(
        &self,
        integration: NewIntegration,
    ) -> ServiceResult<entities::Integration>;

    async fn list_configured(
        &self,
        organization_id: &str,
    ) -> ServiceResult<Vec<(entities::IntegrationConfig, entities::Integration)>>;

    /// Creates or replaces the organization's configuration of an integration.
    async fn configure(
        &self,
        organization_id: &str,
        integration_id: Uuid,
        config: Value,
    ) -> ServiceResult<entities::IntegrationConfig>;

    async fn remove_config(&self, config_id: Uuid) -> ServiceResult<()>;
}

#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn overview(
        &self,
        owner_id: Uuid,
        filter: entities::OverviewFilter,
    ) -> ServiceResult<entities::OverviewCounts>;

    /// The most recent daily counters, newest first.
    async fn metrics(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> ServiceResult<Vec<entities::AnalyticsCounter>>;
}
