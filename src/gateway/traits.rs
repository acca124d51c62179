use async_trait::async_trait;

use super::types::{ChatMessage, DocumentHandle};
use super::upload::PdfUpload;
use crate::utils::DocQaError;

/// The two calls the client makes against the question-answering backend.
///
/// Implementations hold no session state: the caller passes the handle and
/// the history on every call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Submit a PDF for ingestion and get back the handle to ask against
    async fn ingest(&self, upload: &PdfUpload) -> Result<DocumentHandle, DocQaError>;

    /// Ask a question about an ingested document
    async fn ask(
        &self,
        handle: &DocumentHandle,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<String, DocQaError>;

    /// Check that the backend answers at all
    async fn status(&self) -> Result<bool, DocQaError> {
        Ok(true)
    }
}
