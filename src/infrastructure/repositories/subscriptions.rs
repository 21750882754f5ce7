use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Plan, Subscription};
use crate::infrastructure::traits::{RepositoryResult, SubscriptionRepository};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(SubscriptionRepository)]
pub struct DbSubscriptionRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbSubscriptionRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SubscriptionRepository for DbSubscriptionRepository {
    async fn list_active_plans(&self) -> RepositoryResult<Vec<Plan>> {
        Ok(
            sqlx::query_as("SELECT * FROM plans WHERE active = TRUE ORDER BY price_cents ASC")
                .fetch_all(&**self.connection)
                .await?,
        )
    }

    async fn find_plan(&self, plan_id: Uuid) -> RepositoryResult<Option<Plan>> {
        Ok(sqlx::query_as("SELECT * FROM plans WHERE id = ?")
            .bind(plan_id)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn create_plan(&self, plan: Plan) -> RepositoryResult<Plan> {
        Ok(sqlx::query_as(
            "INSERT INTO plans (id, name, price_cents, interval, bot_limit, message_limit, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(plan.id)
        .bind(plan.name)
        .bind(plan.price_cents)
        .bind(plan.interval)
        .bind(plan.bot_limit)
        .bind(plan.message_limit)
        .bind(plan.active)
        .bind(plan.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn latest_subscription(
        &self,
        organization_id: &str,
    ) -> RepositoryResult<Option<Subscription>> {
        Ok(sqlx::query_as(
            "SELECT * FROM subscriptions WHERE organization_id = ? ORDER BY rowid DESC LIMIT 1",
        )
        .bind(organization_id)
        .fetch_optional(&**self.connection)
        .await?)
    }

    async fn create_subscription(
        &self,
        subscription: Subscription,
    ) -> RepositoryResult<Subscription> {
        Ok(sqlx::query_as(
            "INSERT INTO subscriptions (id, organization_id, plan_id, status, current_period_start, current_period_end, cancel_at_period_end, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(subscription.id)
        .bind(subscription.organization_id)
        .bind(subscription.plan_id)
        .bind(subscription.status)
        .bind(subscription.current_period_start)
        .bind(subscription.current_period_end)
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn cancel_subscription(&self, subscription_id: Uuid) -> RepositoryResult<Subscription> {
        Ok(sqlx::query_as(
            "UPDATE subscriptions SET cancel_at_period_end = TRUE WHERE id = ? RETURNING *",
        )
        .bind(subscription_id)
        .fetch_one(&**self.connection)
        .await?)
    }
}
