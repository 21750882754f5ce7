use crate::core::documents::DocumentProcessor;
use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::models::UploadedFile;
use crate::core::traits::DocumentService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::entities::{Document, DocumentStatus};
use crate::infrastructure::traits::{BotRepository, DocumentRepository};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::{info, warn};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[injectable(DocumentService)]
pub struct MyDocumentService {
    documents: Ref<dyn DocumentRepository>,
    bots: Ref<dyn BotRepository>,
    processor: Ref<dyn DocumentProcessor>,
    config: Ref<AppConfig>,
}

impl MyDocumentService {
    pub fn new(
        documents: Ref<dyn DocumentRepository>,
        bots: Ref<dyn BotRepository>,
        processor: Ref<dyn DocumentProcessor>,
        config: Ref<AppConfig>,
    ) -> Self {
        Self {
            documents,
            bots,
            processor,
            config,
        }
    }

    /// Stored files are named by id so client-supplied names never reach the filesystem.
    fn storage_path(&self, document_id: Uuid) -> PathBuf {
        Path::new(&self.config.upload_dir).join(document_id.to_string())
    }
}

#[async_trait]
impl DocumentService for MyDocumentService {
    async fn list_documents(
        &self,
        owner_id: Uuid,
        bot_id: Option<Uuid>,
    ) -> ServiceResult<Vec<Document>> {
        Ok(self.documents.list_documents(owner_id, bot_id).await?)
    }

    async fn upload_document(
        &self,
        owner_id: Uuid,
        bot_id: Uuid,
        file: UploadedFile,
    ) -> ServiceResult<Document> {
        if self.bots.find_owned_bot(owner_id, bot_id).await?.is_none() {
            return Err(ServiceError::not_found("Bot not found"));
        }
        if file.bytes.is_empty() {
            return Err(ServiceError::validation("No file uploaded"));
        }

        let id = Uuid::new_v4();
        let path = self.storage_path(id);
        tokio::fs::create_dir_all(&self.config.upload_dir)
            .await
            .map_err(|e| anyhow!("cannot create upload directory: {e}"))?;
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| anyhow!("cannot store upload: {e}"))?;

        let content = match self.processor.extract_text(&path, &file.mime_type).await {
            Ok(content) => content,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    warn!("failed to remove rejected upload {}: {cleanup}", path.display());
                }
                return Err(e);
            }
        };

        let document = self
            .documents
            .create_document(Document {
                id,
                bot_id,
                name: file.file_name,
                mime_type: file.mime_type,
                size: file.bytes.len() as i64,
                url: path.to_string_lossy().into_owned(),
                content: Some(content),
                status: DocumentStatus::Completed,
                created_at: Utc::now(),
            })
            .await?;
        info!("document {} stored for bot {bot_id}", document.id);

        Ok(document)
    }

    async fn delete_document(&self, owner_id: Uuid, document_id: Uuid) -> ServiceResult<()> {
        let document = self
            .documents
            .find_owned_document(owner_id, document_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Document not found"))?;

        self.documents.delete_document(document.id).await?;
        if let Err(e) = tokio::fs::remove_file(&document.url).await {
            warn!("failed to remove stored file {}: {e}", document.url);
        }
        Ok(())
    }
}
