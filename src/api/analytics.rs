//! Usage analytics for the signed-in user's bots

use crate::api::analytics::schemas::{Metric, Overview, OverviewQuery};
use crate::api::conversations::schemas::BotFilter;
use crate::api::{ApiResult, ExtractUser, QueryParams};
use crate::core::traits::AnalyticsService;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/overview", get(overview))
        .route("/metrics", get(metrics))
}

async fn overview(
    Inject(analytics_service): Inject<dyn AnalyticsService>,
    ExtractUser(current_user): ExtractUser,
    QueryParams(query): QueryParams<OverviewQuery>,
) -> ApiResult<Json<Overview>> {
    let counts = analytics_service
        .overview(current_user.id, query.into())
        .await?;
    Ok(Json(counts.into()))
}

async fn metrics(
    Inject(analytics_service): Inject<dyn AnalyticsService>,
    ExtractUser(current_user): ExtractUser,
    QueryParams(filter): QueryParams<BotFilter>,
) -> ApiResult<Json<Vec<Metric>>> {
    let counters = analytics_service
        .metrics(current_user.id, filter.bot_id)
        .await?;
    Ok(Json(counters.into_iter().map(Metric::from).collect()))
}

pub mod schemas {
    use crate::infrastructure::entities::{self, OverviewCounts, OverviewFilter};
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct OverviewQuery {
        pub bot_id: Option<Uuid>,
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: Option<DateTime<Utc>>,
    }

    /// The date range only applies when both ends are given.
    impl From<OverviewQuery> for OverviewFilter {
        fn from(query: OverviewQuery) -> Self {
            OverviewFilter {
                bot_id: query.bot_id,
                range: query.start_date.zip(query.end_date),
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Overview {
        pub conversations: i64,
        pub messages: i64,
        pub leads: i64,
    }

    impl From<OverviewCounts> for Overview {
        fn from(counts: OverviewCounts) -> Self {
            Overview {
                conversations: counts.conversations,
                messages: counts.messages,
                leads: counts.leads,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Metric {
        pub id: Uuid,
        pub bot_id: Uuid,
        pub date: NaiveDate,
        pub metric: String,
        pub value: i64,
    }

    impl From<entities::AnalyticsCounter> for Metric {
        fn from(counter: entities::AnalyticsCounter) -> Self {
            Metric {
                id: counter.id,
                bot_id: counter.bot_id,
                date: counter.date,
                metric: counter.metric,
                value: counter.value,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn half_open_range_is_ignored() {
            let query: OverviewQuery =
                serde_json::from_str(r#"{"startDate":"2025-01-01T00:00:00Z"}"#).unwrap();
            assert!(OverviewFilter::from(query).range.is_none());
        }

        #[test]
        fn full_range_is_applied() {
            let query: OverviewQuery = serde_json::from_str(
                r#"{"startDate":"2025-01-01T00:00:00Z","endDate":"2025-01-31T00:00:00Z"}"#,
            )
            .unwrap();
            let (start, end) = OverviewFilter::from(query).range.unwrap();
            assert!(start < end);
        }
    }
}
