//! Text extraction for uploaded documents

use crate::core::errors::{ServiceError, ServiceResult};
use anyhow::anyhow;
use async_trait::async_trait;
use di::{inject, injectable};
use std::path::Path;

#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// Returns the text content of the file, or `ValidationFailed` for unsupported types.
    async fn extract_text(&self, path: &Path, mime_type: &str) -> ServiceResult<String>;
}

pub struct TextDocumentProcessor;

#[injectable(DocumentProcessor)]
impl TextDocumentProcessor {
    #[inject]
    pub fn create() -> Self {
        TextDocumentProcessor
    }
}

fn is_plain_text(mime_type: &str) -> bool {
    mime_type.starts_with("text/")
        || matches!(
            mime_type,
            "application/json" | "application/xml" | "application/csv" | "application/x-yaml"
        )
}

#[async_trait]
impl DocumentProcessor for TextDocumentProcessor {
    async fn extract_text(&self, path: &Path, mime_type: &str) -> ServiceResult<String> {
        let mime_type = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if is_plain_text(&mime_type) {
            let bytes = tokio::fs::read(path).await.map_err(|e| anyhow!(e))?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        if mime_type == "application/pdf" {
            let bytes = tokio::fs::read(path).await.map_err(|e| anyhow!(e))?;
            let text =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .map_err(|e| anyhow!(e))?
                    .map_err(|e| ServiceError::validation(format!("Unreadable PDF: {e}")))?;
            return Ok(text);
        }

        Err(ServiceError::validation(format!(
            "Unsupported document type: {mime_type}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_plain_text_files() {
        let path = std::env::temp_dir().join(format!("doc-{}.txt", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "Opening hours: 9 to 5").await.unwrap();

        let text = TextDocumentProcessor
            .extract_text(&path, "text/plain; charset=utf-8")
            .await
            .unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(text, "Opening hours: 9 to 5");
    }

    #[tokio::test]
    async fn rejects_unsupported_types() {
        let result = TextDocumentProcessor
            .extract_text(Path::new("/nonexistent"), "image/png")
            .await;

        assert!(matches!(result, Err(ServiceError::ValidationFailed(_))));
    }
}
