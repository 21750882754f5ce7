use super::bots::expect_one;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Conversation, ConversationWithCount, Message};
use crate::infrastructure::traits::{ConversationRepository, RepositoryResult};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(ConversationRepository)]
pub struct DbConversationRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbConversationRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ConversationRepository for DbConversationRepository {
    async fn find_by_session(
        &self,
        bot_id: Uuid,
        session_id: &str,
    ) -> RepositoryResult<Option<Conversation>> {
        Ok(
            sqlx::query_as("SELECT * FROM conversations WHERE bot_id = ? AND session_id = ?")
                .bind(bot_id)
                .bind(session_id)
                .fetch_optional(&**self.connection)
                .await?,
        )
    }

    async fn create_or_get_conversation(
        &self,
        conversation: Conversation,
    ) -> RepositoryResult<Conversation> {
        // racing first messages for one session converge on the row kept by the
        // unique (bot_id, session_id) index
        sqlx::query(
            "INSERT INTO conversations (id, bot_id, session_id, source, metadata, created_at) VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT (bot_id, session_id) DO NOTHING",
        )
        .bind(conversation.id)
        .bind(conversation.bot_id)
        .bind(&conversation.session_id)
        .bind(conversation.source)
        .bind(conversation.metadata)
        .bind(conversation.created_at)
        .execute(&**self.connection)
        .await?;

        Ok(
            sqlx::query_as("SELECT * FROM conversations WHERE bot_id = ? AND session_id = ?")
                .bind(conversation.bot_id)
                .bind(&conversation.session_id)
                .fetch_one(&**self.connection)
                .await?,
        )
    }

    async fn list_conversations(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<ConversationWithCount>> {
        Ok(sqlx::query_as(
            "SELECT conversations.*, \
                (SELECT COUNT(*) FROM messages WHERE messages.conversation_id = conversations.id) AS message_count \
             FROM conversations INNER JOIN bots ON bots.id = conversations.bot_id \
             WHERE bots.user_id = ? AND (? IS NULL OR conversations.bot_id = ?) \
             ORDER BY conversations.rowid DESC",
        )
        .bind(owner_id)
        .bind(bot_id)
        .bind(bot_id)
        .fetch_all(&**self.connection)
        .await?)
    }

    async fn find_owned_conversation(
        &self,
        owner_id: Uuid,
        conversation_id: Uuid,
    ) -> RepositoryResult<Option<Conversation>> {
        Ok(sqlx::query_as(
            "SELECT conversations.* FROM conversations INNER JOIN bots ON bots.id = conversations.bot_id WHERE conversations.id = ? AND bots.user_id = ?",
        )
        .bind(conversation_id)
        .bind(owner_id)
        .fetch_optional(&**self.connection)
        .await?)
    }

    async fn delete_conversation(&self, conversation_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .execute(&**self.connection)
            .await?;
        expect_one(result.rows_affected())
    }

    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> RepositoryResult<Vec<Message>> {
        Ok(
            sqlx::query_as("SELECT * FROM messages WHERE conversation_id = ? ORDER BY rowid ASC")
                .bind(conversation_id)
                .fetch_all(&**self.connection)
                .await?,
        )
    }

    async fn create_message_in_conversation(&self, message: Message) -> RepositoryResult<Message> {
        Ok(sqlx::query_as(
            "INSERT INTO messages (id, conversation_id, role, content, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.role)
        .bind(message.content)
        .bind(message.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }
}
