//! In-app notifications of the signed-in user

use crate::api::notifications::schemas::{Notification, UnreadCount};
use crate::api::{ApiResult, ExtractUser, MessageBody, PathParam};
use crate::core::traits::NotificationService;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread", get(unread_count))
        .route("/:id/read", put(mark_read))
        .route("/mark-all-read", post(mark_all_read))
}

async fn list_notifications(
    Inject(notification_service): Inject<dyn NotificationService>,
    ExtractUser(current_user): ExtractUser,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = notification_service
        .list_notifications(current_user.id)
        .await?;
    Ok(Json(
        notifications.into_iter().map(Notification::from).collect(),
    ))
}

async fn unread_count(
    Inject(notification_service): Inject<dyn NotificationService>,
    ExtractUser(current_user): ExtractUser,
) -> ApiResult<Json<UnreadCount>> {
    let count = notification_service.unread_count(current_user.id).await?;
    Ok(Json(UnreadCount { count }))
}

async fn mark_read(
    Inject(notification_service): Inject<dyn NotificationService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(notification_id): PathParam<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = notification_service
        .mark_read(current_user.id, notification_id)
        .await?;
    Ok(Json(notification.into()))
}

async fn mark_all_read(
    Inject(notification_service): Inject<dyn NotificationService>,
    ExtractUser(current_user): ExtractUser,
) -> ApiResult<Json<MessageBody>> {
    let changed = notification_service.mark_all_read(current_user.id).await?;
    debug!("marked {changed} notifications read for {}", current_user.id);
    Ok(MessageBody::new("All notifications marked as read"))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Notification {
        pub id: Uuid,
        pub user_id: Uuid,
        #[serde(rename = "type")]
        pub kind: String,
        pub title: String,
        pub message: String,
        pub read: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Notification> for Notification {
        fn from(notification: entities::Notification) -> Self {
            Notification {
                id: notification.id,
                user_id: notification.user_id,
                kind: notification.kind,
                title: notification.title,
                message: notification.message,
                read: notification.read,
                created_at: notification.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct UnreadCount {
        pub count: i64,
    }
}
