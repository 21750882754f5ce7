use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{AnalyticsCounter, OverviewCounts, OverviewFilter};
use crate::infrastructure::traits::{AnalyticsRepository, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(AnalyticsRepository)]
pub struct DbAnalyticsRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbAnalyticsRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }

    async fn count_scoped(
        &self,
        sql: &str,
        owner_id: Uuid,
        filter: &OverviewFilter,
    ) -> RepositoryResult<i64> {
        let (start, end) = match filter.range {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };

        let (count,): (i64,) = sqlx::query_as(sql)
            .bind(owner_id)
            .bind(filter.bot_id)
            .bind(filter.bot_id)
            .bind(start)
            .bind(start)
            .bind(end)
            .bind(end)
            .fetch_one(&**self.connection)
            .await?;
        Ok(count)
    }
}

/// Shared tail of the overview queries; `scope` is the table whose `created_at` is filtered.
fn scoped_where(scope: &str) -> String {
    format!(
        "WHERE bots.user_id = ? \
           AND (? IS NULL OR conversations.bot_id = ?) \
           AND (? IS NULL OR datetime({scope}.created_at) >= datetime(?)) \
           AND (? IS NULL OR datetime({scope}.created_at) <= datetime(?))"
    )
}

#[async_trait]
impl AnalyticsRepository for DbAnalyticsRepository {
    async fn increment_counter(
        &self,
        bot_id: Uuid,
        date: NaiveDate,
        metric: &str,
    ) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO analytics (id, bot_id, date, metric, value) VALUES (?, ?, ?, ?, 1) \
             ON CONFLICT (bot_id, date, metric) DO UPDATE SET value = value + 1",
        )
        .bind(Uuid::new_v4())
        .bind(bot_id)
        .bind(date)
        .bind(metric)
        .execute(&**self.connection)
        .await?;
        Ok(())
    }

    async fn overview(
        &self,
        owner_id: Uuid,
        filter: OverviewFilter,
    ) -> RepositoryResult<OverviewCounts> {
        let conversations = self
            .count_scoped(
                &format!(
                    "SELECT COUNT(*) FROM conversations \
                     INNER JOIN bots ON bots.id = conversations.bot_id {}",
                    scoped_where("conversations")
                ),
                owner_id,
                &filter,
            )
            .await?;

        let messages = self
            .count_scoped(
                &format!(
                    "SELECT COUNT(*) FROM messages \
                     INNER JOIN conversations ON conversations.id = messages.conversation_id \
                     INNER JOIN bots ON bots.id = conversations.bot_id {}",
                    scoped_where("messages")
                ),
                owner_id,
                &filter,
            )
            .await?;

        let leads = self
            .count_scoped(
                &format!(
                    "SELECT COUNT(*) FROM leads \
                     INNER JOIN conversations ON conversations.id = leads.conversation_id \
                     INNER JOIN bots ON bots.id = conversations.bot_id {}",
                    scoped_where("leads")
                ),
                owner_id,
                &filter,
            )
            .await?;

        Ok(OverviewCounts {
            conversations,
            messages,
            leads,
        })
    }

    async fn list_counters(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
        limit: i64,
    ) -> RepositoryResult<Vec<AnalyticsCounter>> {
        Ok(sqlx::query_as(
            "SELECT analytics.* FROM analytics INNER JOIN bots ON bots.id = analytics.bot_id \
             WHERE bots.user_id = ? AND (? IS NULL OR analytics.bot_id = ?) \
             ORDER BY analytics.date DESC, analytics.rowid DESC LIMIT ?",
        )
        .bind(owner_id)
        .bind(bot_id)
        .bind(bot_id)
        .bind(limit)
        .fetch_all(&**self.connection)
        .await?)
    }
}
