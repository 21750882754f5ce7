//! Plans and organization subscriptions

use crate::api::subscriptions::schemas::{
    CreatePlan, CreateSubscription, CurrentSubscription, OrganizationFilter, Plan, Subscription,
};
use crate::api::{ApiResult, ExtractUser, JsonBody, PathParam, QueryParams};
use crate::core::traits::SubscriptionService;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(current_subscription).post(subscribe))
        .route("/plans", get(list_plans).post(create_plan))
        .route("/:id/cancel", post(cancel_subscription))
}

async fn list_plans(
    Inject(subscription_service): Inject<dyn SubscriptionService>,
    ExtractUser(_): ExtractUser,
) -> ApiResult<Json<Vec<Plan>>> {
    let plans = subscription_service.list_plans().await?;
    Ok(Json(plans.into_iter().map(Plan::from).collect()))
}

async fn create_plan(
    Inject(subscription_service): Inject<dyn SubscriptionService>,
    ExtractUser(current_user): ExtractUser,
    JsonBody(body): JsonBody<CreatePlan>,
) -> ApiResult<(StatusCode, Json<Plan>)> {
    current_user.require_admin()?;
    let plan = subscription_service.create_plan(body.into()).await?;
    Ok((StatusCode::CREATED, Json(plan.into())))
}

/// Responds with `null` when the organization has never subscribed.
async fn current_subscription(
    Inject(subscription_service): Inject<dyn SubscriptionService>,
    ExtractUser(_): ExtractUser,
    QueryParams(filter): QueryParams<OrganizationFilter>,
) -> ApiResult<Json<Option<CurrentSubscription>>> {
    let current = subscription_service
        .current_subscription(&filter.organization_id)
        .await?;
    Ok(Json(current.map(CurrentSubscription::from)))
}

async fn subscribe(
    Inject(subscription_service): Inject<dyn SubscriptionService>,
    ExtractUser(_): ExtractUser,
    JsonBody(body): JsonBody<CreateSubscription>,
) -> ApiResult<(StatusCode, Json<Subscription>)> {
    let subscription = subscription_service
        .subscribe(&body.organization_id, body.plan_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription.into())))
}

async fn cancel_subscription(
    Inject(subscription_service): Inject<dyn SubscriptionService>,
    ExtractUser(_): ExtractUser,
    PathParam(subscription_id): PathParam<Uuid>,
) -> ApiResult<Json<Subscription>> {
    let subscription = subscription_service.cancel(subscription_id).await?;
    Ok(Json(subscription.into()))
}

pub mod schemas {
    use crate::core::models::NewPlan;
    use crate::infrastructure::entities::{self, BillingInterval, SubscriptionStatus};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct OrganizationFilter {
        pub organization_id: String,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreatePlan {
        pub name: String,
        /// Price in cents.
        pub price: i64,
        pub interval: BillingInterval,
        pub bot_limit: i64,
        pub message_limit: i64,
    }

    impl From<CreatePlan> for NewPlan {
        fn from(body: CreatePlan) -> Self {
            NewPlan {
                name: body.name,
                price_cents: body.price,
                interval: body.interval,
                bot_limit: body.bot_limit,
                message_limit: body.message_limit,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Plan {
        pub id: Uuid,
        pub name: String,
        pub price: i64,
        pub interval: BillingInterval,
        pub bot_limit: i64,
        pub message_limit: i64,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Plan> for Plan {
        fn from(plan: entities::Plan) -> Self {
            Plan {
                id: plan.id,
                name: plan.name,
                price: plan.price_cents,
                interval: plan.interval,
                bot_limit: plan.bot_limit,
                message_limit: plan.message_limit,
                active: plan.active,
                created_at: plan.created_at,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateSubscription {
        pub organization_id: String,
        pub plan_id: Uuid,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Subscription {
        pub id: Uuid,
        pub organization_id: String,
        pub plan_id: Uuid,
        pub status: SubscriptionStatus,
        pub current_period_start: DateTime<Utc>,
        pub current_period_end: DateTime<Utc>,
        pub cancel_at_period_end: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Subscription> for Subscription {
        fn from(subscription: entities::Subscription) -> Self {
            Subscription {
                id: subscription.id,
                organization_id: subscription.organization_id,
                plan_id: subscription.plan_id,
                status: subscription.status,
                current_period_start: subscription.current_period_start,
                current_period_end: subscription.current_period_end,
                cancel_at_period_end: subscription.cancel_at_period_end,
                created_at: subscription.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct CurrentSubscription {
        #[serde(flatten)]
        pub subscription: Subscription,
        pub plan: Plan,
    }

    impl From<(entities::Subscription, entities::Plan)> for CurrentSubscription {
        fn from((subscription, plan): (entities::Subscription, entities::Plan)) -> Self {
            CurrentSubscription {
                subscription: subscription.into(),
                plan: plan.into(),
            }
        }
    }
}
