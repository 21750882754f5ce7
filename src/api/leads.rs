//! Lead capture and campaign endpoints

use crate::api::leads::schemas::{
    Campaign, CampaignSummary, CreateCampaign, CreateLead, Lead, LeadFilter, LeadSummary,
    UpdateLead,
};
use crate::api::{ApiResult, ExtractUser, JsonBody, PathParam, QueryParams};
use crate::core::traits::LeadService;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/:id", put(update_lead))
}

async fn list_leads(
    Inject(lead_service): Inject<dyn LeadService>,
    ExtractUser(current_user): ExtractUser,
    QueryParams(filter): QueryParams<LeadFilter>,
) -> ApiResult<Json<Vec<LeadSummary>>> {
    let leads = lead_service
        .list_leads(current_user.id, filter.campaign_id, filter.status)
        .await?;
    Ok(Json(leads.into_iter().map(LeadSummary::from).collect()))
}

async fn create_lead(
    Inject(lead_service): Inject<dyn LeadService>,
    ExtractUser(current_user): ExtractUser,
    JsonBody(body): JsonBody<CreateLead>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    let lead = lead_service.create_lead(current_user.id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(lead.into())))
}

async fn update_lead(
    Inject(lead_service): Inject<dyn LeadService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(lead_id): PathParam<Uuid>,
    JsonBody(body): JsonBody<UpdateLead>,
) -> ApiResult<Json<Lead>> {
    let lead = lead_service
        .update_lead(current_user.id, lead_id, body.into())
        .await?;
    Ok(Json(lead.into()))
}

async fn list_campaigns(
    Inject(lead_service): Inject<dyn LeadService>,
    ExtractUser(_): ExtractUser,
) -> ApiResult<Json<Vec<CampaignSummary>>> {
    let campaigns = lead_service.list_campaigns().await?;
    Ok(Json(
        campaigns.into_iter().map(CampaignSummary::from).collect(),
    ))
}

async fn create_campaign(
    Inject(lead_service): Inject<dyn LeadService>,
    ExtractUser(_): ExtractUser,
    JsonBody(body): JsonBody<CreateCampaign>,
) -> ApiResult<(StatusCode, Json<Campaign>)> {
    let campaign = lead_service.create_campaign(body.into()).await?;
    Ok((StatusCode::CREATED, Json(campaign.into())))
}

pub mod schemas {
    use crate::core::models::{LeadChanges, NewCampaign, NewLead};
    use crate::infrastructure::entities::{self, LeadStatus};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct LeadFilter {
        pub campaign_id: Option<Uuid>,
        pub status: Option<LeadStatus>,
    }

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateLead {
        pub conversation_id: Uuid,
        #[serde(default)]
        pub campaign_id: Option<Uuid>,
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub phone: Option<String>,
        #[serde(default)]
        pub score: Option<i64>,
    }

    impl From<CreateLead> for NewLead {
        fn from(body: CreateLead) -> Self {
            NewLead {
                conversation_id: body.conversation_id,
                campaign_id: body.campaign_id,
                name: body.name,
                email: body.email,
                phone: body.phone,
                score: body.score,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct UpdateLead {
        pub status: Option<LeadStatus>,
        pub score: Option<i64>,
    }

    impl From<UpdateLead> for LeadChanges {
        fn from(body: UpdateLead) -> Self {
            LeadChanges {
                status: body.status,
                score: body.score,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Lead {
        pub id: Uuid,
        pub conversation_id: Uuid,
        pub campaign_id: Option<Uuid>,
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub status: LeadStatus,
        pub score: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    impl From<entities::Lead> for Lead {
        fn from(lead: entities::Lead) -> Self {
            Lead {
                id: lead.id,
                conversation_id: lead.conversation_id,
                campaign_id: lead.campaign_id,
                name: lead.name,
                email: lead.email,
                phone: lead.phone,
                status: lead.status,
                score: lead.score,
                created_at: lead.created_at,
                updated_at: lead.updated_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct LeadSummary {
        #[serde(flatten)]
        pub lead: Lead,
        pub bot_name: String,
    }

    impl From<entities::LeadWithBot> for LeadSummary {
        fn from(row: entities::LeadWithBot) -> Self {
            LeadSummary {
                lead: row.lead.into(),
                bot_name: row.bot_name,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct CreateCampaign {
        pub organization_id: Option<String>,
        pub name: String,
        pub description: Option<String>,
        pub credits_limit: Option<i64>,
    }

    impl From<CreateCampaign> for NewCampaign {
        fn from(body: CreateCampaign) -> Self {
            NewCampaign {
                organization_id: body.organization_id,
                name: body.name,
                description: body.description,
                credits_limit: body.credits_limit,
            }
        }
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Campaign {
        pub id: Uuid,
        pub organization_id: Option<String>,
        pub name: String,
        pub description: Option<String>,
        pub credits_limit: i64,
        pub credits_used: i64,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::LeadCampaign> for Campaign {
        fn from(campaign: entities::LeadCampaign) -> Self {
            Campaign {
                id: campaign.id,
                organization_id: campaign.organization_id,
                name: campaign.name,
                description: campaign.description,
                credits_limit: campaign.credits_limit,
                credits_used: campaign.credits_used,
                created_at: campaign.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct LeadCount {
        pub leads: i64,
    }

    #[derive(Serialize, Debug)]
    pub struct CampaignSummary {
        #[serde(flatten)]
        pub campaign: Campaign,
        #[serde(rename = "_count")]
        pub count: LeadCount,
    }

    impl From<entities::CampaignWithCount> for CampaignSummary {
        fn from(row: entities::CampaignWithCount) -> Self {
            CampaignSummary {
                campaign: row.campaign.into(),
                count: LeadCount {
                    leads: row.lead_count,
                },
            }
        }
    }
}
