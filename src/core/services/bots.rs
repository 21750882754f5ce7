use super::{required, verbatim};
use crate::core::email::{self, EmailSender};
use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::models::{FaqChanges, FaqDraft, IntentChanges, IntentDraft, NewBot};
use crate::core::traits::BotService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::entities::{Bot, BotChanges, BotWithCounts, Faq, Intent, Notification};
use crate::infrastructure::traits::{BotRepository, NotificationRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::{info, warn};
use sqlx::types::Json;
use uuid::Uuid;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
const DEFAULT_WELCOME_MESSAGE: &str = "Hello! How can I help you?";
const DEFAULT_COLOR: &str = "#6366f1";

#[injectable(BotService)]
pub struct MyBotService {
    bots: Ref<dyn BotRepository>,
    users: Ref<dyn UserRepository>,
    notifications: Ref<dyn NotificationRepository>,
    mailer: Ref<dyn EmailSender>,
    config: Ref<AppConfig>,
}

impl MyBotService {
    pub fn new(
        bots: Ref<dyn BotRepository>,
        users: Ref<dyn UserRepository>,
        notifications: Ref<dyn NotificationRepository>,
        mailer: Ref<dyn EmailSender>,
        config: Ref<AppConfig>,
    ) -> Self {
        Self {
            bots,
            users,
            notifications,
            mailer,
            config,
        }
    }

    async fn owned_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<BotWithCounts> {
        self.bots
            .find_owned_bot(owner_id, bot_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bot not found"))
    }

    async fn owned_intent(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        intent_id: Uuid,
    ) -> ServiceResult<Intent> {
        self.owned_bot(owner_id, bot_id).await?;
        self.bots
            .find_intent(bot_id, intent_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Intent not found"))
    }

    async fn owned_faq(&self, owner_id: Uuid, bot_id: Uuid, faq_id: Uuid) -> ServiceResult<Faq> {
        self.owned_bot(owner_id, bot_id).await?;
        self.bots
            .find_faq(bot_id, faq_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("FAQ not found"))
    }

    async fn announce_publication(&self, bot: &Bot) {
        let owner = match self.users.find_by_id(bot.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return,
            Err(e) => {
                warn!("failed to load owner of bot {}: {e}", bot.id);
                return;
            }
        };

        if let Err(e) = self
            .notifications
            .create_notification(Notification {
                id: Uuid::new_v4(),
                user_id: owner.id,
                kind: "BOT_PUBLISHED".to_owned(),
                title: "Bot published".to_owned(),
                message: format!("Your bot \"{}\" is now live.", bot.name),
                read: false,
                created_at: Utc::now(),
            })
            .await
        {
            warn!("failed to create publication notification for bot {}: {e}", bot.id);
        }

        let bot_url = format!("{}/bots/{}", self.config.app_url.trim_end_matches('/'), bot.id);
        email::dispatch(
            self.mailer.clone(),
            email::bot_published_email(&owner.email, &owner.name, &bot.name, &bot_url),
        );
    }
}

/// Blank patterns would match every message.
fn check_patterns(patterns: Vec<String>) -> ServiceResult<Vec<String>> {
    if patterns.is_empty() {
        return Err(ServiceError::validation("At least one pattern is required"));
    }
    if patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ServiceError::validation("Patterns must not be empty"));
    }
    Ok(patterns)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl BotService for MyBotService {
    async fn list_bots(&self, owner_id: Uuid) -> ServiceResult<Vec<BotWithCounts>> {
        Ok(self.bots.list_bots(owner_id).await?)
    }

    async fn create_bot(&self, owner_id: Uuid, bot: NewBot) -> ServiceResult<Bot> {
        let now = Utc::now();
        let bot = self
            .bots
            .create_bot(Bot {
                id: Uuid::new_v4(),
                user_id: owner_id,
                organization_id: non_blank(bot.organization_id),
                name: required("name", &bot.name)?,
                description: bot.description,
                system_prompt: non_blank(bot.system_prompt)
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_owned()),
                welcome_message: non_blank(bot.welcome_message)
                    .unwrap_or_else(|| DEFAULT_WELCOME_MESSAGE.to_owned()),
                avatar: bot.avatar,
                color: non_blank(bot.color).unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
                published: false,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!("bot {} created by {owner_id}", bot.id);
        Ok(bot)
    }

    async fn get_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<BotWithCounts> {
        self.owned_bot(owner_id, bot_id).await
    }

    async fn update_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        changes: BotChanges,
    ) -> ServiceResult<Bot> {
        self.owned_bot(owner_id, bot_id).await?;
        if let Some(name) = &changes.name {
            required("name", name)?;
        }
        if let Some(welcome) = &changes.welcome_message {
            required("welcomeMessage", welcome)?;
        }
        Ok(self.bots.update_bot(bot_id, changes).await?)
    }

    async fn delete_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<()> {
        self.owned_bot(owner_id, bot_id).await?;
        self.bots.delete_bot(bot_id).await?;
        info!("bot {bot_id} deleted");
        Ok(())
    }

    async fn publish_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<Bot> {
        self.owned_bot(owner_id, bot_id).await?;
        let bot = self.bots.set_published(bot_id, true).await?;
        info!("bot {bot_id} published");

        self.announce_publication(&bot).await;
        Ok(bot)
    }

    async fn unpublish_bot(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<Bot> {
        self.owned_bot(owner_id, bot_id).await?;
        Ok(self.bots.set_published(bot_id, false).await?)
    }

    async fn list_intents(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<Vec<Intent>> {
        self.owned_bot(owner_id, bot_id).await?;
        Ok(self.bots.list_intents(bot_id).await?)
    }

    async fn create_intent(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        draft: IntentDraft,
    ) -> ServiceResult<Intent> {
        self.owned_bot(owner_id, bot_id).await?;
        Ok(self
            .bots
            .create_intent(Intent {
                id: Uuid::new_v4(),
                bot_id,
                name: required("name", &draft.name)?,
                patterns: Json(check_patterns(draft.patterns)?),
                response: verbatim("response", draft.response)?,
                enabled: true,
                created_at: Utc::now(),
            })
            .await?)
    }

    async fn update_intent(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        intent_id: Uuid,
        changes: IntentChanges,
    ) -> ServiceResult<Intent> {
        let mut intent = self.owned_intent(owner_id, bot_id, intent_id).await?;
        if let Some(name) = changes.name {
            intent.name = required("name", &name)?;
        }
        if let Some(patterns) = changes.patterns {
            intent.patterns = Json(check_patterns(patterns)?);
        }
        if let Some(response) = changes.response {
            intent.response = verbatim("response", response)?;
        }
        if let Some(enabled) = changes.enabled {
            intent.enabled = enabled;
        }
        Ok(self.bots.update_intent(intent).await?)
    }

    async fn delete_intent(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        intent_id: Uuid,
    ) -> ServiceResult<()> {
        self.owned_intent(owner_id, bot_id, intent_id).await?;
        Ok(self.bots.delete_intent(bot_id, intent_id).await?)
    }

    async fn list_faqs(&self, owner_id: Uuid, bot_id: Uuid) -> ServiceResult<Vec<Faq>> {
        self.owned_bot(owner_id, bot_id).await?;
        Ok(self.bots.list_faqs(bot_id).await?)
    }

    async fn create_faq(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        draft: FaqDraft,
    ) -> ServiceResult<Faq> {
        self.owned_bot(owner_id, bot_id).await?;
        Ok(self
            .bots
            .create_faq(Faq {
                id: Uuid::new_v4(),
                bot_id,
                question: verbatim("question", draft.question)?,
                answer: verbatim("answer", draft.answer)?,
                category: non_blank(draft.category),
                enabled: true,
                created_at: Utc::now(),
            })
            .await?)
    }

    async fn update_faq(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        faq_id: Uuid,
        changes: FaqChanges,
    ) -> ServiceResult<Faq> {
        let mut faq = self.owned_faq(owner_id, bot_id, faq_id).await?;
        if let Some(question) = changes.question {
            faq.question = verbatim("question", question)?;
        }
        if let Some(answer) = changes.answer {
            faq.answer = verbatim("answer", answer)?;
        }
        if let Some(category) = changes.category {
            faq.category = non_blank(Some(category));
        }
        if let Some(enabled) = changes.enabled {
            faq.enabled = enabled;
        }
        Ok(self.bots.update_faq(faq).await?)
    }

    async fn delete_faq(&self, owner_id: Uuid, bot_id: Uuid, faq_id: Uuid) -> ServiceResult<()> {
        self.owned_faq(owner_id, bot_id, faq_id).await?;
        Ok(self.bots.delete_faq(bot_id, faq_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_are_stored_as_given() {
        assert_eq!(
            check_patterns(vec![" price ".to_owned(), "cost".to_owned()]).unwrap(),
            vec![" price ", "cost"]
        );
    }

    #[test]
    fn trigger_text_keeps_its_spaces() {
        assert_eq!(verbatim("question", " hours ".to_owned()).unwrap(), " hours ");
        assert!(matches!(
            verbatim("question", "   ".to_owned()),
            Err(ServiceError::ValidationFailed(m)) if m == "question is required"
        ));
    }

    #[test]
    fn empty_patterns_are_rejected() {
        assert!(check_patterns(vec![]).is_err());
        assert!(check_patterns(vec!["price".to_owned(), "  ".to_owned()]).is_err());
    }
}
