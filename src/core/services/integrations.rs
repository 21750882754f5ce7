use super::required;
use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::models::NewIntegration;
use crate::core::traits::IntegrationService;
use crate::infrastructure::entities::{Integration, IntegrationConfig};
use crate::infrastructure::traits::IntegrationRepository;
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use serde_json::Value;
use uuid::Uuid;

#[injectable(IntegrationService)]
pub struct MyIntegrationService {
    repo: Ref<dyn IntegrationRepository>,
}

impl MyIntegrationService {
    pub fn new(repo: Ref<dyn IntegrationRepository>) -> Self {
        Self { repo }
    }
}

fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[async_trait]
impl IntegrationService for MyIntegrationService {
    async fn list_integrations(&self) -> ServiceResult<Vec<Integration>> {
        Ok(self.repo.list_active_integrations().await?)
    }

    async fn create_integration(&self, integration: NewIntegration) -> ServiceResult<Integration> {
        let slug = integration.slug.trim().to_owned();
        if !valid_slug(&slug) {
            return Err(ServiceError::validation(
                "slug may only contain lowercase letters, digits and dashes",
            ));
        }

        Ok(self
            .repo
            .create_integration(Integration {
                id: Uuid::new_v4(),
                name: required("name", &integration.name)?,
                slug,
                description: integration.description,
                active: true,
                created_at: Utc::now(),
            })
            .await?)
    }

    async fn list_configured(
        &self,
        organization_id: &str,
    ) -> ServiceResult<Vec<(IntegrationConfig, Integration)>> {
        let organization_id = required("organizationId", organization_id)?;
        Ok(self.repo.list_configs(&organization_id).await?)
    }

    async fn configure(
        &self,
        organization_id: &str,
        integration_id: Uuid,
        config: Value,
    ) -> ServiceResult<IntegrationConfig> {
        let organization_id = required("organizationId", organization_id)?;
        if !config.is_object() {
            return Err(ServiceError::validation("config must be a JSON object"));
        }
        match self.repo.find_integration(integration_id).await? {
            Some(integration) if integration.active => {}
            _ => return Err(ServiceError::not_found("Integration not found")),
        }

        Ok(self
            .repo
            .upsert_config(&organization_id, integration_id, config)
            .await?)
    }

    async fn remove_config(&self, config_id: Uuid) -> ServiceResult<()> {
        Ok(self.repo.delete_config(config_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_kebab_case() {
        assert!(valid_slug("slack"));
        assert!(valid_slug("google-sheets-2"));
        assert!(!valid_slug(""));
        assert!(!valid_slug("Google Sheets"));
    }
}
