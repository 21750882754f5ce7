use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::traits::ConversationService;
use crate::infrastructure::entities::{Conversation, ConversationWithCount, Message};
use crate::infrastructure::traits::ConversationRepository;
use async_trait::async_trait;
use di::{Ref, injectable};
use uuid::Uuid;

#[injectable(ConversationService)]
pub struct MyConversationService {
    repo: Ref<dyn ConversationRepository>,
}

impl MyConversationService {
    pub fn new(repo: Ref<dyn ConversationRepository>) -> Self {
        Self { repo }
    }

    async fn owned(&self, owner_id: Uuid, conversation_id: Uuid) -> ServiceResult<Conversation> {
        self.repo
            .find_owned_conversation(owner_id, conversation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation not found"))
    }
}

#[async_trait]
impl ConversationService for MyConversationService {
    async fn list_conversations(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> ServiceResult<Vec<ConversationWithCount>> {
        Ok(self.repo.list_conversations(owner_id, bot_id).await?)
    }

    async fn get_conversation(
        &self,
        owner_id: Uuid,
        conversation_id: Uuid,
    ) -> ServiceResult<(Conversation, Vec<Message>)> {
        let conversation = self.owned(owner_id, conversation_id).await?;
        let messages = self.repo.list_conversation_messages(conversation.id).await?;
        Ok((conversation, messages))
    }

    async fn delete_conversation(
        &self,
        owner_id: Uuid,
        conversation_id: Uuid,
    ) -> ServiceResult<()> {
        self.owned(owner_id, conversation_id).await?;
        Ok(self.repo.delete_conversation(conversation_id).await?)
    }
}
