use super::required;
use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::models::{LeadChanges, NewCampaign, NewLead};
use crate::core::traits::LeadService;
use crate::infrastructure::entities::{
    CampaignWithCount, Lead, LeadCampaign, LeadStatus, LeadWithBot,
};
use crate::infrastructure::traits::{ConversationRepository, LeadRepository};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use uuid::Uuid;

const DEFAULT_CREDITS_LIMIT: i64 = 100;

#[injectable(LeadService)]
pub struct MyLeadService {
    leads: Ref<dyn LeadRepository>,
    conversations: Ref<dyn ConversationRepository>,
}

impl MyLeadService {
    pub fn new(
        leads: Ref<dyn LeadRepository>,
        conversations: Ref<dyn ConversationRepository>,
    ) -> Self {
        Self {
            leads,
            conversations,
        }
    }
}

fn validate_score(score: i64) -> ServiceResult<i64> {
    if (0..=100).contains(&score) {
        Ok(score)
    } else {
        Err(ServiceError::validation("Score must be between 0 and 100"))
    }
}

#[async_trait]
impl LeadService for MyLeadService {
    async fn list_leads(
        &self,
        owner_id: Uuid,
        campaign_id: Option<Uuid>,
        status: Option<LeadStatus>,
    ) -> ServiceResult<Vec<LeadWithBot>> {
        Ok(self.leads.list_leads(owner_id, campaign_id, status).await?)
    }

    async fn create_lead(&self, owner_id: Uuid, lead: NewLead) -> ServiceResult<Lead> {
        if self
            .conversations
            .find_owned_conversation(owner_id, lead.conversation_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Conversation not found"));
        }
        if let Some(campaign_id) = lead.campaign_id {
            if self.leads.find_campaign(campaign_id).await?.is_none() {
                return Err(ServiceError::not_found("Campaign not found"));
            }
        }
        if lead.name.is_none() && lead.email.is_none() && lead.phone.is_none() {
            return Err(ServiceError::validation(
                "A lead needs at least a name, an email or a phone number",
            ));
        }

        let now = Utc::now();
        Ok(self
            .leads
            .create_lead(Lead {
                id: Uuid::new_v4(),
                conversation_id: lead.conversation_id,
                campaign_id: lead.campaign_id,
                name: lead.name,
                email: lead.email,
                phone: lead.phone,
                status: LeadStatus::New,
                score: validate_score(lead.score.unwrap_or(0))?,
                created_at: now,
                updated_at: now,
            })
            .await?)
    }

    async fn update_lead(
        &self,
        owner_id: Uuid,
        lead_id: Uuid,
        changes: LeadChanges,
    ) -> ServiceResult<Lead> {
        let mut lead = self
            .leads
            .find_owned_lead(owner_id, lead_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lead not found"))?;

        if let Some(status) = changes.status {
            lead.status = status;
        }
        if let Some(score) = changes.score {
            lead.score = validate_score(score)?;
        }
        lead.updated_at = Utc::now();

        Ok(self.leads.update_lead(lead).await?)
    }

    async fn list_campaigns(&self) -> ServiceResult<Vec<CampaignWithCount>> {
        Ok(self.leads.list_campaigns().await?)
    }

    async fn create_campaign(&self, campaign: NewCampaign) -> ServiceResult<LeadCampaign> {
        let credits_limit = campaign.credits_limit.unwrap_or(DEFAULT_CREDITS_LIMIT);
        if credits_limit < 0 {
            return Err(ServiceError::validation("creditsLimit must not be negative"));
        }

        Ok(self
            .leads
            .create_campaign(LeadCampaign {
                id: Uuid::new_v4(),
                organization_id: campaign.organization_id,
                name: required("name", &campaign.name)?,
                description: campaign.description,
                credits_limit,
                credits_used: 0,
                created_at: Utc::now(),
            })
            .await?)
    }
}
