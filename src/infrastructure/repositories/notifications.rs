use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::Notification;
use crate::infrastructure::traits::{NotificationRepository, RepositoryResult};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(NotificationRepository)]
pub struct DbNotificationRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbNotificationRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl NotificationRepository for DbNotificationRepository {
    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> RepositoryResult<Vec<Notification>> {
        Ok(sqlx::query_as(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY rowid DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&**self.connection)
        .await?)
    }

    async fn count_unread(&self, user_id: Uuid) -> RepositoryResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&**self.connection)
        .await?;
        Ok(count)
    }

    async fn create_notification(
        &self,
        notification: Notification,
    ) -> RepositoryResult<Notification> {
        Ok(sqlx::query_as(
            "INSERT INTO notifications (id, user_id, kind, title, message, read, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(notification.title)
        .bind(notification.message)
        .bind(notification.read)
        .bind(notification.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> RepositoryResult<Notification> {
        Ok(sqlx::query_as(
            "UPDATE notifications SET read = TRUE WHERE id = ? AND user_id = ? RETURNING *",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> RepositoryResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = ? AND read = FALSE")
                .bind(user_id)
                .execute(&**self.connection)
                .await?;
        Ok(result.rows_affected())
    }
}
