//! Database entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Bot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: String,
    pub welcome_message: String,
    pub avatar: Option<String>,
    pub color: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bot row together with the sizes of its owned collections.
#[derive(Debug, Clone, FromRow)]
pub struct BotWithCounts {
    #[sqlx(flatten)]
    pub bot: Bot,
    pub conversation_count: i64,
    pub document_count: i64,
    pub intent_count: i64,
    pub faq_count: i64,
}

/// Fields of a bot that an owner may change after creation.
#[derive(Debug, Clone, Default)]
pub struct BotChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub welcome_message: Option<String>,
    pub avatar: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Intent {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub name: String,
    pub patterns: Json<Vec<String>>,
    pub response: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Faq {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything the chat path needs from a bot, loaded in one go.
#[derive(Debug, Clone)]
pub struct BotRules {
    pub bot: Bot,
    pub intents: Vec<Intent>,
    pub faqs: Vec<Faq>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub content: Option<String>,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub session_id: String,
    pub source: String,
    pub metadata: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ConversationWithCount {
    #[sqlx(flatten)]
    pub conversation: Conversation,
    pub message_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

#[derive(Debug, Clone, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: LeadStatus,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LeadWithBot {
    #[sqlx(flatten)]
    pub lead: Lead,
    pub bot_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct LeadCampaign {
    pub id: Uuid,
    pub organization_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub credits_limit: i64,
    pub credits_used: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CampaignWithCount {
    #[sqlx(flatten)]
    pub campaign: LeadCampaign,
    pub lead_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Integration {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct IntegrationConfig {
    pub id: Uuid,
    pub organization_id: String,
    pub integration_id: Uuid,
    pub config: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BillingInterval {
    Month,
    Year,
}

#[derive(Debug, Clone, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub interval: BillingInterval,
    pub bot_limit: i64,
    pub message_limit: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
}

#[derive(Debug, Clone, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub organization_id: String,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AnalyticsCounter {
    pub id: Uuid,
    pub bot_id: Uuid,
    pub date: NaiveDate,
    pub metric: String,
    pub value: i64,
}

/// Optional filters for the analytics overview counts.
#[derive(Debug, Clone, Default)]
pub struct OverviewFilter {
    pub bot_id: Option<Uuid>,
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverviewCounts {
    pub conversations: i64,
    pub messages: i64,
    pub leads: i64,
}
