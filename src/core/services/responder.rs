use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::matcher::select_reply;
use crate::core::models::{ChatReply, ChatRequest};
use crate::core::traits::ConversationResponder;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::entities::{Bot, Conversation, Message, MessageRole};
use crate::infrastructure::traits::{AnalyticsRepository, BotRepository, ConversationRepository};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::{debug, warn};
use serde_json::Value;
use uuid::Uuid;

const DEFAULT_SOURCE: &str = "widget";
const MESSAGES_METRIC: &str = "messages";
const BOT_UNAVAILABLE: &str = "Bot not found or not published";

#[injectable(ConversationResponder)]
pub struct MyConversationResponder {
    bots: Ref<dyn BotRepository>,
    conversations: Ref<dyn ConversationRepository>,
    analytics: Ref<dyn AnalyticsRepository>,
    config: Ref<AppConfig>,
}

impl MyConversationResponder {
    pub fn new(
        bots: Ref<dyn BotRepository>,
        conversations: Ref<dyn ConversationRepository>,
        analytics: Ref<dyn AnalyticsRepository>,
        config: Ref<AppConfig>,
    ) -> Self {
        Self {
            bots,
            conversations,
            analytics,
            config,
        }
    }

    async fn resolve_conversation(
        &self,
        bot_id: Uuid,
        session_id: &str,
        metadata: Option<Value>,
    ) -> ServiceResult<Conversation> {
        if let Some(conversation) = self.conversations.find_by_session(bot_id, session_id).await? {
            return Ok(conversation);
        }

        let conversation = self
            .conversations
            .create_or_get_conversation(Conversation {
                id: Uuid::new_v4(),
                bot_id,
                session_id: session_id.to_owned(),
                source: source_of(metadata.as_ref()),
                metadata: metadata.map(sqlx::types::Json),
                created_at: Utc::now(),
            })
            .await?;
        debug!("conversation {} opened for bot {bot_id}", conversation.id);

        Ok(conversation)
    }

    async fn log_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: String,
    ) -> ServiceResult<Message> {
        Ok(self
            .conversations
            .create_message_in_conversation(Message {
                id: Uuid::new_v4(),
                conversation_id,
                role,
                content,
                created_at: Utc::now(),
            })
            .await?)
    }

    /// Best-effort: a failed increment is logged and otherwise ignored.
    async fn count_message(&self, bot_id: Uuid) {
        if !self.config.analytics_enabled {
            return;
        }

        let today = Utc::now().date_naive();
        if let Err(e) = self
            .analytics
            .increment_counter(bot_id, today, MESSAGES_METRIC)
            .await
        {
            warn!("failed to update {MESSAGES_METRIC} counter for bot {bot_id}: {e}");
        }
    }
}

/// `metadata.source` when it is a non-empty string, `"widget"` otherwise.
fn source_of(metadata: Option<&Value>) -> String {
    metadata
        .and_then(|m| m.get("source"))
        .and_then(Value::as_str)
        .filter(|source| !source.is_empty())
        .unwrap_or(DEFAULT_SOURCE)
        .to_owned()
}

#[async_trait]
impl ConversationResponder for MyConversationResponder {
    async fn respond(&self, request: ChatRequest) -> ServiceResult<ChatReply> {
        // must be decided before any write
        let rules = match self.bots.load_bot_rules(request.bot_id).await? {
            Some(rules) if rules.bot.published => rules,
            _ => return Err(ServiceError::not_found(BOT_UNAVAILABLE)),
        };

        let conversation = self
            .resolve_conversation(rules.bot.id, &request.session_id, request.metadata)
            .await?;

        self.log_message(conversation.id, MessageRole::User, request.message.clone())
            .await?;

        let reply = select_reply(
            &request.message,
            &rules.bot.welcome_message,
            &rules.intents,
            &rules.faqs,
        )
        .to_owned();

        self.log_message(conversation.id, MessageRole::Assistant, reply.clone())
            .await?;

        self.count_message(rules.bot.id).await;

        Ok(ChatReply {
            reply,
            conversation_id: conversation.id,
            bot_name: rules.bot.name,
        })
    }

    async fn bot_config(&self, bot_id: Uuid) -> ServiceResult<Bot> {
        match self.bots.find_bot(bot_id).await? {
            Some(bot) if bot.published => Ok(bot),
            _ => Err(ServiceError::not_found(BOT_UNAVAILABLE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_defaults_to_widget() {
        assert_eq!(source_of(None), "widget");
        assert_eq!(source_of(Some(&json!({ "page": "/pricing" }))), "widget");
        assert_eq!(source_of(Some(&json!({ "source": "" }))), "widget");
        assert_eq!(source_of(Some(&json!({ "source": 42 }))), "widget");
    }

    #[test]
    fn source_is_taken_from_metadata() {
        assert_eq!(source_of(Some(&json!({ "source": "telegram" }))), "telegram");
    }
}
