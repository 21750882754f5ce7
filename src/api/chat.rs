//! Public chat endpoints used by embedded widgets

use crate::api::chat::schemas::{BotConfig, ChatResponse, SendMessage};
use crate::api::{ApiResult, JsonBody, PathParam};
use crate::core::errors::ServiceError;
use crate::core::models::ChatRequest;
use crate::core::traits::ConversationResponder;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", post(send_message))
        .route("/:bot_id/config", get(bot_config))
}

async fn send_message(
    Inject(responder): Inject<dyn ConversationResponder>,
    JsonBody(body): JsonBody<SendMessage>,
) -> ApiResult<Json<ChatResponse>> {
    let request = body.into_request()?;
    let reply = responder.respond(request).await?;
    Ok(Json(reply.into()))
}

async fn bot_config(
    Inject(responder): Inject<dyn ConversationResponder>,
    PathParam(bot_id): PathParam<String>,
) -> ApiResult<Json<BotConfig>> {
    let bot = responder.bot_config(schemas::parse_bot_id(&bot_id)?).await?;
    Ok(Json(bot.into()))
}

pub mod schemas {
    use super::*;
    use crate::core::errors::ServiceResult;
    use crate::core::models::ChatReply;
    use crate::infrastructure::entities;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct SendMessage {
        pub bot_id: String,
        pub message: String,
        pub session_id: String,
        pub metadata: Option<Value>,
    }

    /// A bot id that is not a UUID cannot name a bot, so it is reported as missing.
    pub fn parse_bot_id(raw: &str) -> ServiceResult<Uuid> {
        Uuid::parse_str(raw.trim())
            .map_err(|_| ServiceError::not_found("Bot not found or not published"))
    }

    impl SendMessage {
        pub fn into_request(self) -> ServiceResult<ChatRequest> {
            for (field, value) in [
                ("botId", &self.bot_id),
                ("message", &self.message),
                ("sessionId", &self.session_id),
            ] {
                if value.trim().is_empty() {
                    return Err(ServiceError::validation(format!("{field} is required")));
                }
            }
            let bot_id = parse_bot_id(&self.bot_id)?;

            Ok(ChatRequest {
                bot_id,
                session_id: self.session_id,
                message: self.message,
                metadata: self.metadata,
            })
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ChatResponse {
        pub message: String,
        pub conversation_id: Uuid,
        pub bot_name: String,
    }

    impl From<ChatReply> for ChatResponse {
        fn from(reply: ChatReply) -> Self {
            ChatResponse {
                message: reply.reply,
                conversation_id: reply.conversation_id,
                bot_name: reply.bot_name,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct BotConfig {
        pub id: Uuid,
        pub name: String,
        pub avatar: Option<String>,
        pub welcome_message: String,
        pub color: String,
        pub published: bool,
    }

    impl From<entities::Bot> for BotConfig {
        fn from(bot: entities::Bot) -> Self {
            BotConfig {
                id: bot.id,
                name: bot.name,
                avatar: bot.avatar,
                welcome_message: bot.welcome_message,
                color: bot.color,
                published: bot.published,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde_json::json;

        fn parse(body: Value) -> SendMessage {
            serde_json::from_value(body).unwrap()
        }

        #[test]
        fn missing_fields_are_validation_errors() {
            let err = parse(json!({ "message": "hi", "sessionId": "s1" }))
                .into_request()
                .unwrap_err();
            assert!(matches!(err, ServiceError::ValidationFailed(m) if m == "botId is required"));
        }

        #[test]
        fn malformed_bot_id_is_not_found() {
            let err = parse(json!({ "botId": "nope", "message": "hi", "sessionId": "s1" }))
                .into_request()
                .unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(_)));
        }

        #[test]
        fn message_text_is_kept_verbatim() {
            let bot_id = Uuid::new_v4();
            let request = parse(json!({
                "botId": bot_id,
                "message": "  What's your COST? ",
                "sessionId": "s1",
                "metadata": { "source": "docs" },
            }))
            .into_request()
            .unwrap();

            assert_eq!(request.bot_id, bot_id);
            assert_eq!(request.message, "  What's your COST? ");
            assert_eq!(request.metadata, Some(json!({ "source": "docs" })));
        }
    }
}
