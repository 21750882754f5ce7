use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Bot, BotChanges, BotRules, BotWithCounts, Faq, Intent};
use crate::infrastructure::traits::{BotRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use uuid::Uuid;

const BOT_WITH_COUNTS: &str = "SELECT bots.*, \
    (SELECT COUNT(*) FROM conversations WHERE conversations.bot_id = bots.id) AS conversation_count, \
    (SELECT COUNT(*) FROM documents WHERE documents.bot_id = bots.id) AS document_count, \
    (SELECT COUNT(*) FROM intents WHERE intents.bot_id = bots.id) AS intent_count, \
    (SELECT COUNT(*) FROM faqs WHERE faqs.bot_id = bots.id) AS faq_count \
    FROM bots";

#[injectable(BotRepository)]
pub struct DbBotRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbBotRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl BotRepository for DbBotRepository {
    async fn list_bots(&self, owner_id: Uuid) -> RepositoryResult<Vec<BotWithCounts>> {
        Ok(sqlx::query_as(&format!(
            "{BOT_WITH_COUNTS} WHERE bots.user_id = ? ORDER BY bots.rowid DESC"
        ))
        .bind(owner_id)
        .fetch_all(&**self.connection)
        .await?)
    }

    async fn create_bot(&self, bot: Bot) -> RepositoryResult<Bot> {
        Ok(sqlx::query_as(
            "INSERT INTO bots (id, user_id, organization_id, name, description, system_prompt, welcome_message, avatar, color, published, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(bot.id)
        .bind(bot.user_id)
        .bind(bot.organization_id)
        .bind(bot.name)
        .bind(bot.description)
        .bind(bot.system_prompt)
        .bind(bot.welcome_message)
        .bind(bot.avatar)
        .bind(bot.color)
        .bind(bot.published)
        .bind(bot.created_at)
        .bind(bot.updated_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn find_bot(&self, bot_id: Uuid) -> RepositoryResult<Option<Bot>> {
        Ok(sqlx::query_as("SELECT * FROM bots WHERE id = ?")
            .bind(bot_id)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn find_owned_bot(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
    ) -> RepositoryResult<Option<BotWithCounts>> {
        Ok(sqlx::query_as(&format!(
            "{BOT_WITH_COUNTS} WHERE bots.id = ? AND bots.user_id = ?"
        ))
        .bind(bot_id)
        .bind(owner_id)
        .fetch_optional(&**self.connection)
        .await?)
    }

    async fn update_bot(&self, bot_id: Uuid, changes: BotChanges) -> RepositoryResult<Bot> {
        Ok(sqlx::query_as(
            "UPDATE bots SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                system_prompt = COALESCE(?, system_prompt), \
                welcome_message = COALESCE(?, welcome_message), \
                avatar = COALESCE(?, avatar), \
                color = COALESCE(?, color), \
                updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.system_prompt)
        .bind(changes.welcome_message)
        .bind(changes.avatar)
        .bind(changes.color)
        .bind(Utc::now())
        .bind(bot_id)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn set_published(&self, bot_id: Uuid, published: bool) -> RepositoryResult<Bot> {
        Ok(
            sqlx::query_as("UPDATE bots SET published = ?, updated_at = ? WHERE id = ? RETURNING *")
                .bind(published)
                .bind(Utc::now())
                .bind(bot_id)
                .fetch_one(&**self.connection)
                .await?,
        )
    }

    async fn delete_bot(&self, bot_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM bots WHERE id = ?")
            .bind(bot_id)
            .execute(&**self.connection)
            .await?;
        expect_one(result.rows_affected())
    }

    async fn load_bot_rules(&self, bot_id: Uuid) -> RepositoryResult<Option<BotRules>> {
        let Some(bot) = self.find_bot(bot_id).await? else {
            return Ok(None);
        };

        let intents = sqlx::query_as("SELECT * FROM intents WHERE bot_id = ? ORDER BY rowid ASC")
            .bind(bot_id)
            .fetch_all(&**self.connection)
            .await?;
        let faqs = sqlx::query_as("SELECT * FROM faqs WHERE bot_id = ? ORDER BY rowid ASC")
            .bind(bot_id)
            .fetch_all(&**self.connection)
            .await?;

        Ok(Some(BotRules { bot, intents, faqs }))
    }

    async fn list_intents(&self, bot_id: Uuid) -> RepositoryResult<Vec<Intent>> {
        Ok(
            sqlx::query_as("SELECT * FROM intents WHERE bot_id = ? ORDER BY rowid DESC")
                .bind(bot_id)
                .fetch_all(&**self.connection)
                .await?,
        )
    }

    async fn find_intent(&self, bot_id: Uuid, intent_id: Uuid) -> RepositoryResult<Option<Intent>> {
        Ok(
            sqlx::query_as("SELECT * FROM intents WHERE id = ? AND bot_id = ?")
                .bind(intent_id)
                .bind(bot_id)
                .fetch_optional(&**self.connection)
                .await?,
        )
    }

    async fn create_intent(&self, intent: Intent) -> RepositoryResult<Intent> {
        Ok(sqlx::query_as(
            "INSERT INTO intents (id, bot_id, name, patterns, response, enabled, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(intent.id)
        .bind(intent.bot_id)
        .bind(intent.name)
        .bind(intent.patterns)
        .bind(intent.response)
        .bind(intent.enabled)
        .bind(intent.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn update_intent(&self, intent: Intent) -> RepositoryResult<Intent> {
        Ok(sqlx::query_as(
            "UPDATE intents SET name = ?, patterns = ?, response = ?, enabled = ? WHERE id = ? AND bot_id = ? RETURNING *",
        )
        .bind(intent.name)
        .bind(intent.patterns)
        .bind(intent.response)
        .bind(intent.enabled)
        .bind(intent.id)
        .bind(intent.bot_id)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn delete_intent(&self, bot_id: Uuid, intent_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM intents WHERE id = ? AND bot_id = ?")
            .bind(intent_id)
            .bind(bot_id)
            .execute(&**self.connection)
            .await?;
        expect_one(result.rows_affected())
    }

    async fn list_faqs(&self, bot_id: Uuid) -> RepositoryResult<Vec<Faq>> {
        Ok(
            sqlx::query_as("SELECT * FROM faqs WHERE bot_id = ? ORDER BY rowid DESC")
                .bind(bot_id)
                .fetch_all(&**self.connection)
                .await?,
        )
    }

    async fn find_faq(&self, bot_id: Uuid, faq_id: Uuid) -> RepositoryResult<Option<Faq>> {
        Ok(sqlx::query_as("SELECT * FROM faqs WHERE id = ? AND bot_id = ?")
            .bind(faq_id)
            .bind(bot_id)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn create_faq(&self, faq: Faq) -> RepositoryResult<Faq> {
        Ok(sqlx::query_as(
            "INSERT INTO faqs (id, bot_id, question, answer, category, enabled, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(faq.id)
        .bind(faq.bot_id)
        .bind(faq.question)
        .bind(faq.answer)
        .bind(faq.category)
        .bind(faq.enabled)
        .bind(faq.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn update_faq(&self, faq: Faq) -> RepositoryResult<Faq> {
        Ok(sqlx::query_as(
            "UPDATE faqs SET question = ?, answer = ?, category = ?, enabled = ? WHERE id = ? AND bot_id = ? RETURNING *",
        )
        .bind(faq.question)
        .bind(faq.answer)
        .bind(faq.category)
        .bind(faq.enabled)
        .bind(faq.id)
        .bind(faq.bot_id)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn delete_faq(&self, bot_id: Uuid, faq_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ? AND bot_id = ?")
            .bind(faq_id)
            .bind(bot_id)
            .execute(&**self.connection)
            .await?;
        expect_one(result.rows_affected())
    }
}

pub(super) fn expect_one(rows_affected: u64) -> RepositoryResult<()> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}
