use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    CampaignWithCount, Lead, LeadCampaign, LeadStatus, LeadWithBot,
};
use crate::infrastructure::traits::{LeadRepository, RepositoryResult};
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(LeadRepository)]
pub struct DbLeadRepository {
    connection: Ref<DatabaseConnection>,
}

impl DbLeadRepository {
    pub fn new(connection: Ref<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl LeadRepository for DbLeadRepository {
    async fn list_leads(
        &self,
        owner_id: Uuid,
        campaign_id: Option<Uuid>,
        status: Option<LeadStatus>,
    ) -> RepositoryResult<Vec<LeadWithBot>> {
        Ok(sqlx::query_as(
            "SELECT leads.*, bots.name AS bot_name FROM leads \
             INNER JOIN conversations ON conversations.id = leads.conversation_id \
             INNER JOIN bots ON bots.id = conversations.bot_id \
             WHERE bots.user_id = ? \
               AND (? IS NULL OR leads.campaign_id = ?) \
               AND (? IS NULL OR leads.status = ?) \
             ORDER BY leads.rowid DESC",
        )
        .bind(owner_id)
        .bind(campaign_id)
        .bind(campaign_id)
        .bind(status)
        .bind(status)
        .fetch_all(&**self.connection)
        .await?)
    }

    async fn create_lead(&self, lead: Lead) -> RepositoryResult<Lead> {
        Ok(sqlx::query_as(
            "INSERT INTO leads (id, conversation_id, campaign_id, name, email, phone, status, score, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(lead.id)
        .bind(lead.conversation_id)
        .bind(lead.campaign_id)
        .bind(lead.name)
        .bind(lead.email)
        .bind(lead.phone)
        .bind(lead.status)
        .bind(lead.score)
        .bind(lead.created_at)
        .bind(lead.updated_at)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn find_owned_lead(
        &self,
        owner_id: Uuid,
        lead_id: Uuid,
    ) -> RepositoryResult<Option<Lead>> {
        Ok(sqlx::query_as(
            "SELECT leads.* FROM leads \
             INNER JOIN conversations ON conversations.id = leads.conversation_id \
             INNER JOIN bots ON bots.id = conversations.bot_id \
             WHERE leads.id = ? AND bots.user_id = ?",
        )
        .bind(lead_id)
        .bind(owner_id)
        .fetch_optional(&**self.connection)
        .await?)
    }

    async fn update_lead(&self, lead: Lead) -> RepositoryResult<Lead> {
        Ok(sqlx::query_as(
            "UPDATE leads SET status = ?, score = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(lead.status)
        .bind(lead.score)
        .bind(lead.updated_at)
        .bind(lead.id)
        .fetch_one(&**self.connection)
        .await?)
    }

    async fn list_campaigns(&self) -> RepositoryResult<Vec<CampaignWithCount>> {
        Ok(sqlx::query_as(
            "SELECT lead_campaigns.*, \
                (SELECT COUNT(*) FROM leads WHERE leads.campaign_id = lead_campaigns.id) AS lead_count \
             FROM lead_campaigns ORDER BY lead_campaigns.rowid DESC",
        )
        .fetch_all(&**self.connection)
        .await?)
    }

    async fn find_campaign(&self, campaign_id: Uuid) -> RepositoryResult<Option<LeadCampaign>> {
        Ok(sqlx::query_as("SELECT * FROM lead_campaigns WHERE id = ?")
            .bind(campaign_id)
            .fetch_optional(&**self.connection)
            .await?)
    }

    async fn create_campaign(&self, campaign: LeadCampaign) -> RepositoryResult<LeadCampaign> {
        Ok(sqlx::query_as(
            "INSERT INTO lead_campaigns (id, organization_id, name, description, credits_limit, credits_used, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(campaign.id)
        .bind(campaign.organization_id)
        .bind(campaign.name)
        .bind(campaign.description)
        .bind(campaign.credits_limit)
        .bind(campaign.credits_used)
        .bind(campaign.created_at)
        .fetch_one(&**self.connection)
        .await?)
    }
}
