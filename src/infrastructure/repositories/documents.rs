use super::bots::expect_one;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::Document;
use crate::infrastructure::traits::{DocumentRepository, RepositoryResult};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(DocumentRepository)]
pub struct DbDocumentRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbDocumentRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl DocumentRepository for DbDocumentRepository {
    async fn list_documents(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<Document>> {
        Ok(sqlx::query_as(
            "SELECT documents.* FROM documents INNER JOIN bots ON bots.id = documents.bot_id \
             WHERE bots.user_id = ? AND (? IS NULL OR documents.bot_id = ?) \
             ORDER BY documents.rowid DESC",
        )
        .bind(owner_id)
        .bind(bot_id)
        .bind(bot_id)
        .fetch_all(&**self.connection)
        .await?)
    }

    async fn create_document(&self, document: Document) -> RepositoryResult<Document> {
        Ok(sqlx::query_as(
            "INSERT INTO documents (id, bot_id, name, mime_type, size, url, content, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(document.id)
        .bind(document.bot_id)
        .bind(document.name)
        .bind(document.mime_type)
        .bind(document.size)
        .bind(document.url)
        .bind(document.content)
        .bind(document.status)
        .bind(document.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn find_owned_document(
        &self,
        owner_id: Uuid,
        document_id: Uuid,
    ) -> RepositoryResult<Option<Document>> {
        Ok(sqlx::query_as(
            "SELECT documents.* FROM documents INNER JOIN bots ON bots.id = documents.bot_id WHERE documents.id = ? AND bots.user_id = ?",
        )
        .bind(document_id)
        .bind(owner_id)
        .fetch_optional(&**self.connection)
        .await?)
    }

    async fn delete_document(&self, document_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document_id)
            .execute(&**self.connection)
            .await?;
        expect_one(result.rows_affected())
    }
}
