use super::bots::expect_one;
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Integration, IntegrationConfig};
use crate::infrastructure::traits::{IntegrationRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

#[injectable(IntegrationRepository)]
pub struct DbIntegrationRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbIntegrationRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl IntegrationRepository for DbIntegrationRepository {
    async fn list_active_integrations(&self) -> RepositoryResult<Vec<Integration>> {
        Ok(
            sqlx::query_as("SELECT * FROM integrations WHERE active = TRUE ORDER BY name ASC")
                .fetch_all(&**self.connection)
                .await?,
        )
    }

    async fn create_integration(&self, integration: Integration) -> RepositoryResult<Integration> {
        Ok(sqlx::query_as(
            "INSERT INTO integrations (id, name, slug, description, active, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(integration.id)
        .bind(integration.name)
        .bind(integration.slug)
        .bind(integration.description)
        .bind(integration.active)
        .bind(integration.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn find_integration(
        &self,
        integration_id: Uuid,
    ) -> RepositoryResult<Option<Integration>> {
        Ok(sqlx::query_as("SELECT * FROM integrations WHERE id = ?")
            .bind(integration_id)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn list_configs(
        &self,
        organization_id: &str,
    ) -> RepositoryResult<Vec<(IntegrationConfig, Integration)>> {
        let configs: Vec<IntegrationConfig> = sqlx::query_as(
            "SELECT * FROM integration_configs WHERE organization_id = ? ORDER BY rowid ASC",
        )
        .bind(organization_id)
        .fetch_all(&**self.connection)
        .await?;

        let mut joined = Vec::with_capacity(configs.len());
        for config in configs {
            let integration = self
                .find_integration(config.integration_id)
                .await?
                .ok_or(RepositoryError::NotFound)?;
            joined.push((config, integration));
        }
        Ok(joined)
    }

    async fn upsert_config(
        &self,
        organization_id: &str,
        integration_id: Uuid,
        config: Value,
    ) -> RepositoryResult<IntegrationConfig> {
        let now = Utc::now();
        Ok(sqlx::query_as(
            "INSERT INTO integration_configs (id, organization_id, integration_id, config, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (organization_id, integration_id) DO UPDATE SET config = excluded.config, updated_at = excluded.updated_at \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(integration_id)
        .bind(Json(config))
        .bind(now)
        .bind(now)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn delete_config(&self, config_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM integration_configs WHERE id = ?")
            .bind(config_id)
            .execute(&**self.connection)
            .await?;
        expect_one(result.rows_affected())
    }
}
