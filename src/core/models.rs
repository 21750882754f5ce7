//! Inputs and outputs of the services that are not database rows.

use crate::infrastructure::entities::{BillingInterval, LeadStatus, User};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, Default)]
pub struct NewBot {
    pub name: String,
    pub description: Option<String>,
    pub organization_id: Option<String>,
    pub system_prompt: Option<String>,
    pub welcome_message: Option<String>,
    pub avatar: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IntentDraft {
    pub name: String,
    pub patterns: Vec<String>,
    pub response: String,
}

#[derive(Debug, Clone, Default)]
pub struct IntentChanges {
    pub name: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub response: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct FaqDraft {
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FaqChanges {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub enabled: Option<bool>,
}

/// One inbound message from an embedded chat widget.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub bot_id: Uuid,
    pub session_id: String,
    pub message: String,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub conversation_id: Uuid,
    pub bot_name: String,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewLead {
    pub conversation_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadChanges {
    pub status: Option<LeadStatus>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub organization_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub credits_limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub price_cents: i64,
    pub interval: BillingInterval,
    pub bot_limit: i64,
    pub message_limit: i64,
}

#[derive(Debug, Clone)]
pub struct NewIntegration {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}
