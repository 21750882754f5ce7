use super::required;
use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::models::NewPlan;
use crate::core::traits::SubscriptionService;
use crate::infrastructure::entities::{Plan, Subscription, SubscriptionStatus};
use crate::infrastructure::traits::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use di::{Ref, injectable};
use log::info;
use uuid::Uuid;

const BILLING_PERIOD_DAYS: i64 = 30;

#[injectable(SubscriptionService)]
pub struct MySubscriptionService {
    repo: Ref<dyn SubscriptionRepository>,
}

impl MySubscriptionService {
    pub fn new(repo: Ref<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SubscriptionService for MySubscriptionService {
    async fn list_plans(&self) -> ServiceResult<Vec<Plan>> {
        Ok(self.repo.list_active_plans().await?)
    }

    async fn create_plan(&self, plan: NewPlan) -> ServiceResult<Plan> {
        if plan.price_cents < 0 || plan.bot_limit < 0 || plan.message_limit < 0 {
            return Err(ServiceError::validation(
                "Price and limits must not be negative",
            ));
        }

        Ok(self
            .repo
            .create_plan(Plan {
                id: Uuid::new_v4(),
                name: required("name", &plan.name)?,
                price_cents: plan.price_cents,
                interval: plan.interval,
                bot_limit: plan.bot_limit,
                message_limit: plan.message_limit,
                active: true,
                created_at: Utc::now(),
            })
            .await?)
    }

    async fn current_subscription(
        &self,
        organization_id: &str,
    ) -> ServiceResult<Option<(Subscription, Plan)>> {
        let Some(subscription) = self.repo.latest_subscription(organization_id).await? else {
            return Ok(None);
        };
        let plan = self
            .repo
            .find_plan(subscription.plan_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Plan not found"))?;
        Ok(Some((subscription, plan)))
    }

    async fn subscribe(&self, organization_id: &str, plan_id: Uuid) -> ServiceResult<Subscription> {
        let organization_id = required("organizationId", organization_id)?;
        match self.repo.find_plan(plan_id).await? {
            Some(plan) if plan.active => {}
            _ => return Err(ServiceError::not_found("Plan not found")),
        }

        let now = Utc::now();
        let subscription = self
            .repo
            .create_subscription(Subscription {
                id: Uuid::new_v4(),
                organization_id,
                plan_id,
                status: SubscriptionStatus::Active,
                current_period_start: now,
                current_period_end: now + Duration::days(BILLING_PERIOD_DAYS),
                cancel_at_period_end: false,
                created_at: now,
            })
            .await?;
        info!(
            "organization {} subscribed to plan {plan_id}",
            subscription.organization_id
        );
        Ok(subscription)
    }

    async fn cancel(&self, subscription_id: Uuid) -> ServiceResult<Subscription> {
        Ok(self.repo.cancel_subscription(subscription_id).await?)
    }
}
