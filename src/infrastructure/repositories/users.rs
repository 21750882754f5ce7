use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{RefreshToken, User};
use crate::infrastructure::traits::{RepositoryResult, UserRepository};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(UserRepository)]
pub struct DbUserRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbUserRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn find_by_id(&self, user_id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn create_user(&self, user: User) -> RepositoryResult<User> {
        Ok(sqlx::query_as(
            "INSERT INTO users (id, email, password_hash, name, role, avatar, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.role)
        .bind(user.avatar)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn store_refresh_token(&self, token: RefreshToken) -> RepositoryResult<RefreshToken> {
        Ok(sqlx::query_as(
            "INSERT INTO refresh_tokens (id, token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(token.id)
        .bind(token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn find_refresh_token(&self, token: &str) -> RepositoryResult<Option<RefreshToken>> {
        Ok(sqlx::query_as("SELECT * FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn delete_refresh_token(&self, token: &str) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&**self.connection)
            .await?;
        Ok(result.rows_affected())
    }
}
