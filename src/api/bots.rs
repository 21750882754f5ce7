//! Bot management endpoints, including the bot's intents and FAQs

use crate::api::bots::schemas::{
    Bot, BotSummary, CreateBot, CreateFaq, CreateIntent, Faq, Intent, UpdateBot, UpdateFaq,
    UpdateIntent,
};
use crate::api::{ApiResult, ExtractUser, JsonBody, MessageBody, PathParam};
use crate::core::traits::BotService;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_bots).post(create_bot))
        .route("/:id", get(get_bot).put(update_bot).delete(delete_bot))
        .route("/:id/publish", post(publish_bot))
        .route("/:id/unpublish", post(unpublish_bot))
        .route("/:id/intents", get(list_intents).post(create_intent))
        .route(
            "/:id/intents/:intent_id",
            put(update_intent).delete(delete_intent),
        )
        .route("/:id/faqs", get(list_faqs).post(create_faq))
        .route("/:id/faqs/:faq_id", put(update_faq).delete(delete_faq))
}

async fn list_bots(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
) -> ApiResult<Json<Vec<BotSummary>>> {
    let bots = bot_service.list_bots(current_user.id).await?;
    Ok(Json(bots.into_iter().map(BotSummary::from).collect()))
}

async fn create_bot(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    JsonBody(body): JsonBody<CreateBot>,
) -> ApiResult<(StatusCode, Json<Bot>)> {
    let bot = bot_service.create_bot(current_user.id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(bot.into())))
}

async fn get_bot(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
) -> ApiResult<Json<BotSummary>> {
    let bot = bot_service.get_bot(current_user.id, bot_id).await?;
    Ok(Json(bot.into()))
}

async fn update_bot(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateBot>,
) -> ApiResult<Json<Bot>> {
    let bot = bot_service
        .update_bot(current_user.id, bot_id, body.into())
        .await?;
    Ok(Json(bot.into()))
}

async fn delete_bot(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
) -> ApiResult<Json<MessageBody>> {
    bot_service.delete_bot(current_user.id, bot_id).await?;
    Ok(MessageBody::new("Bot deleted successfully"))
}

async fn publish_bot(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
) -> ApiResult<Json<Bot>> {
    let bot = bot_service.publish_bot(current_user.id, bot_id).await?;
    Ok(Json(bot.into()))
}

async fn unpublish_bot(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
) -> ApiResult<Json<Bot>> {
    let bot = bot_service.unpublish_bot(current_user.id, bot_id).await?;
    Ok(Json(bot.into()))
}

async fn list_intents(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
) -> ApiResult<Json<Vec<Intent>>> {
    let intents = bot_service.list_intents(current_user.id, bot_id).await?;
    Ok(Json(intents.into_iter().map(Intent::from).collect()))
}

async fn create_intent(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<CreateIntent>,
) -> ApiResult<(StatusCode, Json<Intent>)> {
    let intent = bot_service
        .create_intent(current_user.id, bot_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(intent.into())))
}

async fn update_intent(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam((bot_id, intent_id)): PathParam<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<UpdateIntent>,
) -> ApiResult<Json<Intent>> {
    let intent = bot_service
        .update_intent(current_user.id, bot_id, intent_id, body.into())
        .await?;
    Ok(Json(intent.into()))
}

async fn delete_intent(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam((bot_id, intent_id)): PathParam<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageBody>> {
    bot_service
        .delete_intent(current_user.id, bot_id, intent_id)
        .await?;
    Ok(MessageBody::new("Intent deleted successfully"))
}

async fn list_faqs(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
) -> ApiResult<Json<Vec<Faq>>> {
    let faqs = bot_service.list_faqs(current_user.id, bot_id).await?;
    Ok(Json(faqs.into_iter().map(Faq::from).collect()))
}

async fn create_faq(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(bot_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<CreateFaq>,
) -> ApiResult<(StatusCode, Json<Faq>)> {
    let faq = bot_service
        .create_faq(current_user.id, bot_id, body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(faq.into())))
}

async fn update_faq(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam((bot_id, faq_id)): PathParam<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<UpdateFaq>,
) -> ApiResult<Json<Faq>> {
    let faq = bot_service
        .update_faq(current_user.id, bot_id, faq_id, body.into())
        .await?;
    Ok(Json(faq.into()))
}

async fn delete_faq(
    Inject(bot_service): Inject<dyn BotService>,
    ExtractUser(current_user): ExtractUser,
    PathParam((bot_id, faq_id)): PathParam<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageBody>> {
    bot_service
        .delete_faq(current_user.id, bot_id, faq_id)
        .await?;
    Ok(MessageBody::new("FAQ deleted successfully"))
}

pub mod schemas {
    use crate::core::models::{FaqChanges, FaqDraft, IntentChanges, IntentDraft, NewBot};
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct CreateBot {
        pub name: String,
        pub description: Option<String>,
        pub organization_id: Option<String>,
        pub system_prompt: Option<String>,
        pub welcome_message: Option<String>,
        pub avatar: Option<String>,
        pub color: Option<String>,
    }

    impl From<CreateBot> for NewBot {
        fn from(body: CreateBot) -> Self {
            NewBot {
                name: body.name,
                description: body.description,
                organization_id: body.organization_id,
                system_prompt: body.system_prompt,
                welcome_message: body.welcome_message,
                avatar: body.avatar,
                color: body.color,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct UpdateBot {
        pub name: Option<String>,
        pub description: Option<String>,
        pub system_prompt: Option<String>,
        pub welcome_message: Option<String>,
        pub avatar: Option<String>,
        pub color: Option<String>,
    }

    impl From<UpdateBot> for entities::BotChanges {
        fn from(body: UpdateBot) -> Self {
            entities::BotChanges {
                name: body.name,
                description: body.description,
                system_prompt: body.system_prompt,
                welcome_message: body.welcome_message,
                avatar: body.avatar,
                color: body.color,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
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

    impl From<entities::Bot> for Bot {
        fn from(bot: entities::Bot) -> Self {
            Bot {
                id: bot.id,
                user_id: bot.user_id,
                organization_id: bot.organization_id,
                name: bot.name,
                description: bot.description,
                system_prompt: bot.system_prompt,
                welcome_message: bot.welcome_message,
                avatar: bot.avatar,
                color: bot.color,
                published: bot.published,
                created_at: bot.created_at,
                updated_at: bot.updated_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct BotCounts {
        pub conversations: i64,
        pub documents: i64,
        pub intents: i64,
        pub faqs: i64,
    }

    #[derive(Serialize, Debug)]
    pub struct BotSummary {
        #[serde(flatten)]
        pub bot: Bot,
        #[serde(rename = "_count")]
        pub count: BotCounts,
    }

    impl From<entities::BotWithCounts> for BotSummary {
        fn from(row: entities::BotWithCounts) -> Self {
            BotSummary {
                bot: row.bot.into(),
                count: BotCounts {
                    conversations: row.conversation_count,
                    documents: row.document_count,
                    intents: row.intent_count,
                    faqs: row.faq_count,
                },
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct CreateIntent {
        pub name: String,
        pub patterns: Vec<String>,
        pub response: String,
    }

    impl From<CreateIntent> for IntentDraft {
        fn from(body: CreateIntent) -> Self {
            IntentDraft {
                name: body.name,
                patterns: body.patterns,
                response: body.response,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct UpdateIntent {
        pub name: Option<String>,
        pub patterns: Option<Vec<String>>,
        pub response: Option<String>,
        pub enabled: Option<bool>,
    }

    impl From<UpdateIntent> for IntentChanges {
        fn from(body: UpdateIntent) -> Self {
            IntentChanges {
                name: body.name,
                patterns: body.patterns,
                response: body.response,
                enabled: body.enabled,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Intent {
        pub id: Uuid,
        pub bot_id: Uuid,
        pub name: String,
        pub patterns: Vec<String>,
        pub response: String,
        pub enabled: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Intent> for Intent {
        fn from(intent: entities::Intent) -> Self {
            Intent {
                id: intent.id,
                bot_id: intent.bot_id,
                name: intent.name,
                patterns: intent.patterns.0,
                response: intent.response,
                enabled: intent.enabled,
                created_at: intent.created_at,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct CreateFaq {
        pub question: String,
        pub answer: String,
        pub category: Option<String>,
    }

    impl From<CreateFaq> for FaqDraft {
        fn from(body: CreateFaq) -> Self {
            FaqDraft {
                question: body.question,
                answer: body.answer,
                category: body.category,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct UpdateFaq {
        pub question: Option<String>,
        pub answer: Option<String>,
        pub category: Option<String>,
        pub enabled: Option<bool>,
    }

    impl From<UpdateFaq> for FaqChanges {
        fn from(body: UpdateFaq) -> Self {
            FaqChanges {
                question: body.question,
                answer: body.answer,
                category: body.category,
                enabled: body.enabled,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Faq {
        pub id: Uuid,
        pub bot_id: Uuid,
        pub question: String,
        pub answer: String,
        pub category: Option<String>,
        pub enabled: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Faq> for Faq {
        fn from(faq: entities::Faq) -> Self {
            Faq {
                id: faq.id,
                bot_id: faq.bot_id,
                question: faq.question,
                answer: faq.answer,
                category: faq.category,
                enabled: faq.enabled,
                created_at: faq.created_at,
            }
        }
    }
}
