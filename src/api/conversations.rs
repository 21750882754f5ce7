//! Conversations endpoints

use crate::api::conversations::schemas::{BotFilter, ConversationDetail, ConversationSummary};
use crate::api::{ApiResult, ExtractUser, MessageBody, PathParam, QueryParams};
use crate::core::traits::ConversationService;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_conversations))
        .route("/:id", get(get_conversation).delete(delete_conversation))
}

async fn list_conversations(
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
    QueryParams(filter): QueryParams<BotFilter>,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let conversations = conversation_service
        .list_conversations(current_user.id, filter.bot_id)
        .await?;

    Ok(Json(
        conversations
            .into_iter()
            .map(ConversationSummary::from)
            .collect(),
    ))
}

async fn get_conversation(
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(conversation_id): PathParam<Uuid>,
) -> ApiResult<Json<ConversationDetail>> {
    let (conversation, messages) = conversation_service
        .get_conversation(current_user.id, conversation_id)
        .await?;
    Ok(Json(ConversationDetail::new(conversation, messages)))
}

async fn delete_conversation(
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(conversation_id): PathParam<Uuid>,
) -> ApiResult<Json<MessageBody>> {
    conversation_service
        .delete_conversation(current_user.id, conversation_id)
        .await?;
    Ok(MessageBody::new("Conversation deleted"))
}

pub mod schemas {
    use crate::infrastructure::entities::{self, MessageRole};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct BotFilter {
        pub bot_id: Option<Uuid>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Conversation {
        pub id: Uuid,
        pub bot_id: Uuid,
        pub session_id: String,
        pub source: String,
        pub metadata: Option<Value>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Conversation> for Conversation {
        fn from(conversation: entities::Conversation) -> Self {
            Conversation {
                id: conversation.id,
                bot_id: conversation.bot_id,
                session_id: conversation.session_id,
                source: conversation.source,
                metadata: conversation.metadata.map(|metadata| metadata.0),
                created_at: conversation.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct MessageCount {
        pub messages: i64,
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationSummary {
        #[serde(flatten)]
        pub conversation: Conversation,
        #[serde(rename = "_count")]
        pub count: MessageCount,
    }

    impl From<entities::ConversationWithCount> for ConversationSummary {
        fn from(row: entities::ConversationWithCount) -> Self {
            ConversationSummary {
                conversation: row.conversation.into(),
                count: MessageCount {
                    messages: row.message_count,
                },
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Message {
        pub id: Uuid,
        pub conversation_id: Uuid,
        pub role: MessageRole,
        pub content: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                conversation_id: message.conversation_id,
                role: message.role,
                content: message.content,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationDetail {
        #[serde(flatten)]
        pub conversation: Conversation,
        pub messages: Vec<Message>,
    }

    impl ConversationDetail {
        pub fn new(conversation: entities::Conversation, messages: Vec<entities::Message>) -> Self {
            ConversationDetail {
                conversation: conversation.into(),
                messages: messages.into_iter().map(Message::from).collect(),
            }
        }
    }
}
