use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::traits::AnalyticsService;
use crate::infrastructure::entities::{AnalyticsCounter, OverviewCounts, OverviewFilter};
use crate::infrastructure::traits::AnalyticsRepository;
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

const METRICS_WINDOW: i64 = 30;

#[injectable(AnalyticsService)]
pub struct MyAnalyticsService {
    repo: Ref<dyn AnalyticsRepository>,
}

impl MyAnalyticsService {
    pub fn new(repo: Ref<dyn AnalyticsRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl AnalyticsService for MyAnalyticsService {
    async fn overview(
        &self,
        owner_id: Uuid,
        filter: OverviewFilter,
    ) -> ServiceResult<OverviewCounts> {
        if let Some((start, end)) = filter.range {
            if start > end {
                return Err(ServiceError::validation("startDate must not be after endDate"));
            }
        }
        Ok(self.repo.overview(owner_id, filter).await?)
    }

    async fn metrics(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> ServiceResult<Vec<AnalyticsCounter>> {
        Ok(self.repo.list_counters(owner_id, bot_id, METRICS_WINDOW).await?)
    }
}
