use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::traits::Backend;
use super::types::{
    AskRequest, AskResponse, ChatMessage, DocumentHandle, ErrorBody, StatusResponse,
    UploadResponse,
};
use super::upload::PdfUpload;
use crate::app::BackendConfig;
use crate::constants::{
    ASK_ENDPOINT, PDF_MIME_TYPE, STATUS_TIMEOUT_MS, UPLOAD_ENDPOINT, UPLOAD_FIELD_NAME,
};
use crate::utils::DocQaError;

/// Backend reached over HTTP
pub struct HttpBackend {
    client: Client,
    api_root: String,
}

impl HttpBackend {
    /// Create a backend client from configuration. Requests use the
    /// transport's default timeouts.
    pub fn new(config: &BackendConfig) -> Result<Self, DocQaError> {
        Ok(Self::with_client(Client::builder().build()?, config))
    }

    pub fn with_client(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            api_root: join_api_root(&config.base_url, &config.api_prefix),
        }
    }

    /// Base URL plus API prefix, without a trailing slash
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.api_root, name)
    }

    fn unreachable(&self, url: &str, err: reqwest::Error) -> DocQaError {
        DocQaError::Network(format!("could not reach backend at {}: {}", url, err))
    }
}

fn join_api_root(base_url: &str, api_prefix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let prefix = api_prefix.trim_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, prefix)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn ingest(&self, upload: &PdfUpload) -> Result<DocumentHandle, DocQaError> {
        let url = self.endpoint(UPLOAD_ENDPOINT);
        info!("Uploading {} ({} bytes) to {}", upload.file_name(), upload.size(), url);

        let part = Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str(PDF_MIME_TYPE)?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.unreachable(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            // The error body is optional and may not even be JSON
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message());
            warn!("Upload rejected with {}: {:?}", status, detail);
            return Err(DocQaError::IngestionFailed(
                detail.unwrap_or_else(|| "Upload failed".to_string()),
            ));
        }

        let body: UploadResponse = response.json().await?;
        info!(
            "Upload accepted: {} ({})",
            body.filename,
            body.message.as_deref().unwrap_or("no message")
        );
        debug!("Backend content type for upload: {:?}", body.content_type);

        Ok(DocumentHandle::new(body.filename))
    }

    async fn ask(
        &self,
        handle: &DocumentHandle,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<String, DocQaError> {
        let url = self.endpoint(ASK_ENDPOINT);
        debug!(
            "Asking about {} with {} history messages",
            handle,
            history.len()
        );

        let request = AskRequest {
            filename: handle.as_str(),
            question,
            history,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unreachable(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Question about {} failed with {}", handle, status);
            return Err(DocQaError::AskFailed(status.as_u16()));
        }

        let body: AskResponse = response.json().await?;
        Ok(body.answer)
    }

    async fn status(&self) -> Result<bool, DocQaError> {
        // Short timeout so a dead backend doesn't stall `docqa status`
        let client = Client::builder()
            .timeout(Duration::from_millis(STATUS_TIMEOUT_MS))
            .build()?;
        let url = format!("{}/", self.api_root);

        match client.get(&url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                if ok {
                    let body = response.json::<StatusResponse>().await.unwrap_or_default();
                    debug!("Backend status: {:?}", body.status);
                }
                Ok(ok)
            }
            Err(e) => {
                debug!("Status probe to {} failed: {}", url, e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_root_joining() {
        assert_eq!(
            join_api_root("http://localhost:8000", "/api"),
            "http://localhost:8000/api"
        );
        assert_eq!(
            join_api_root("http://localhost:8000/", "api/"),
            "http://localhost:8000/api"
        );
        assert_eq!(join_api_root("http://backend", ""), "http://backend");
        assert_eq!(join_api_root("http://backend", "/"), "http://backend");
    }

    #[test]
    fn test_endpoints() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://127.0.0.1:9000".to_string(),
            api_prefix: "/api".to_string(),
        })
        .unwrap();
        assert_eq!(backend.endpoint(UPLOAD_ENDPOINT), "http://127.0.0.1:9000/api/upload");
        assert_eq!(backend.endpoint(ASK_ENDPOINT), "http://127.0.0.1:9000/api/ask");
    }
}
