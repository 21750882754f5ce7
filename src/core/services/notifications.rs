use crate::core::errors::ServiceResult;
use crate::core::traits::NotificationService;
use crate::infrastructure::entities::Notification;
use crate::infrastructure::traits::NotificationRepository;
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

const PAGE_SIZE: i64 = 50;

#[injectable(NotificationService)]
pub struct MyNotificationService {
    repo: Ref<dyn NotificationRepository>,
}

impl MyNotificationService {
    pub fn new(repo: Ref<dyn NotificationRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl NotificationService for MyNotificationService {
    async fn list_notifications(&self, user_id: Uuid) -> ServiceResult<Vec<Notification>> {
        Ok(self.repo.list_notifications(user_id, PAGE_SIZE).await?)
    }

    async fn unread_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        Ok(self.repo.count_unread(user_id).await?)
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> ServiceResult<Notification> {
        Ok(self.repo.mark_read(user_id, notification_id).await?)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> ServiceResult<u64> {
        Ok(self.repo.mark_all_read(user_id).await?)
    }
}
