//! Integration catalog and per-organization configuration

use crate::api::integrations::schemas::{
    ConfigureIntegration, ConfiguredIntegration, CreateIntegration, Integration,
    IntegrationConfig,
};
use crate::api::subscriptions::schemas::OrganizationFilter;
use crate::api::{ApiResult, ExtractUser, JsonBody, MessageBody, PathParam, QueryParams};
use crate::core::traits::IntegrationService;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_integrations).post(create_integration))
        .route("/configured", get(list_configured))
        .route("/configure", post(configure))
        .route("/:id", delete(remove_config))
}

async fn list_integrations(
    Inject(integration_service): Inject<dyn IntegrationService>,
    ExtractUser(_): ExtractUser,
) -> ApiResult<Json<Vec<Integration>>> {
    let integrations = integration_service.list_integrations().await?;
    Ok(Json(
        integrations.into_iter().map(Integration::from).collect(),
    ))
}

async fn create_integration(
    Inject(integration_service): Inject<dyn IntegrationService>,
    ExtractUser(current_user): ExtractUser,
    JsonBody(body): JsonBody<CreateIntegration>,
) -> ApiResult<(StatusCode, Json<Integration>)> {
    current_user.require_admin()?;
    let integration = integration_service.create_integration(body.into()).await?;
    Ok((StatusCode::CREATED, Json(integration.into())))
}

async fn list_configured(
    Inject(integration_service): Inject<dyn IntegrationService>,
    ExtractUser(_): ExtractUser,
    QueryParams(filter): QueryParams<OrganizationFilter>,
) -> ApiResult<Json<Vec<ConfiguredIntegration>>> {
    let configs = integration_service
        .list_configured(&filter.organization_id)
        .await?;
    Ok(Json(
        configs
            .into_iter()
            .map(ConfiguredIntegration::from)
            .collect(),
    ))
}

async fn configure(
    Inject(integration_service): Inject<dyn IntegrationService>,
    ExtractUser(_): ExtractUser,
    JsonBody(body): JsonBody<ConfigureIntegration>,
) -> ApiResult<(StatusCode, Json<IntegrationConfig>)> {
    let config = integration_service
        .configure(&body.organization_id, body.integration_id, body.config)
        .await?;
    Ok((StatusCode::CREATED, Json(config.into())))
}

async fn remove_config(
    Inject(integration_service): Inject<dyn IntegrationService>,
    ExtractUser(_): ExtractUser,
    PathParam(config_id): PathParam<Uuid>,
) -> ApiResult<Json<MessageBody>> {
    integration_service.remove_config(config_id).await?;
    Ok(MessageBody::new("Integration removed"))
}

pub mod schemas {
    use crate::core::models::NewIntegration;
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct CreateIntegration {
        pub name: String,
        pub slug: String,
        pub description: Option<String>,
    }

    impl From<CreateIntegration> for NewIntegration {
        fn from(body: CreateIntegration) -> Self {
            NewIntegration {
                name: body.name,
                slug: body.slug,
                description: body.description,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Integration {
        pub id: Uuid,
        pub name: String,
        pub slug: String,
        pub description: Option<String>,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Integration> for Integration {
        fn from(integration: entities::Integration) -> Self {
            Integration {
                id: integration.id,
                name: integration.name,
                slug: integration.slug,
                description: integration.description,
                active: integration.active,
                created_at: integration.created_at,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct ConfigureIntegration {
        pub organization_id: String,
        pub integration_id: Uuid,
        pub config: Value,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct IntegrationConfig {
        pub id: Uuid,
        pub organization_id: String,
        pub integration_id: Uuid,
        pub config: Value,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<entities::IntegrationConfig> for IntegrationConfig {
        fn from(config: entities::IntegrationConfig) -> Self {
            IntegrationConfig {
                id: config.id,
                organization_id: config.organization_id,
                integration_id: config.integration_id,
                config: config.config.0,
                created_at: config.created_at,
                updated_at: config.updated_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConfiguredIntegration {
        #[serde(flatten)]
        pub config: IntegrationConfig,
        pub integration: Integration,
    }

    impl From<(entities::IntegrationConfig, entities::Integration)> for ConfiguredIntegration {
        fn from(
            (config, integration): (entities::IntegrationConfig, entities::Integration),
        ) -> Self {
            ConfiguredIntegration {
                config: config.into(),
                integration: integration.into(),
            }
        }
    }
}
