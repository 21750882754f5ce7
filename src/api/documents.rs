//! Knowledge-base document endpoints

use crate::api::conversations::schemas::BotFilter;
use crate::api::documents::schemas::Document;
use crate::api::{ApiResult, ExtractUser, MessageBody, PathParam, QueryParams};
use crate::core::errors::ServiceError;
use crate::core::models::UploadedFile;
use crate::core::traits::DocumentService;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_documents).post(upload_document))
        .route("/:id", delete(delete_document))
}

async fn list_documents(
    Inject(document_service): Inject<dyn DocumentService>,
    ExtractUser(current_user): ExtractUser,
    QueryParams(filter): QueryParams<BotFilter>,
) -> ApiResult<Json<Vec<Document>>> {
    let documents = document_service
        .list_documents(current_user.id, filter.bot_id)
        .await?;
    Ok(Json(documents.into_iter().map(Document::from).collect()))
}

/// Expects a multipart form with a `file` part and a `botId` field.
async fn upload_document(
    Inject(document_service): Inject<dyn DocumentService>,
    ExtractUser(current_user): ExtractUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let mut bot_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::validation(e.body_text()))?
    {
        match field.name() {
            Some("botId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::validation(e.body_text()))?;
                bot_id = Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| ServiceError::validation("botId must be a UUID"))?,
                );
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let mime_type = field.content_type().unwrap_or(DEFAULT_MIME_TYPE).to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::validation(e.body_text()))?;
                file = Some(UploadedFile {
                    file_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ServiceError::validation("No file uploaded"))?;
    let bot_id = bot_id.ok_or_else(|| ServiceError::validation("botId is required"))?;

    let document = document_service
        .upload_document(current_user.id, bot_id, file)
        .await?;
    Ok((StatusCode::CREATED, Json(document.into())))
}

async fn delete_document(
    Inject(document_service): Inject<dyn DocumentService>,
    ExtractUser(current_user): ExtractUser,
    PathParam(document_id): PathParam<Uuid>,
) -> ApiResult<Json<MessageBody>> {
    document_service
        .delete_document(current_user.id, document_id)
        .await?;
    Ok(MessageBody::new("Document deleted"))
}

pub mod schemas {
    use crate::infrastructure::entities::{self, DocumentStatus};
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use uuid::Uuid;

    /// Document metadata. The extracted text stays server side.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Document {
        pub id: Uuid,
        pub bot_id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub mime_type: String,
        pub size: i64,
        pub status: DocumentStatus,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Document> for Document {
        fn from(document: entities::Document) -> Self {
            Document {
                id: document.id,
                bot_id: document.bot_id,
                name: document.name,
                mime_type: document.mime_type,
                size: document.size,
                status: document.status,
                created_at: document.created_at,
            }
        }
    }
}
