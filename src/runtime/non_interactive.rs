use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    cli::OutputFormat,
    gateway::{Backend, DocumentHandle, PdfUpload},
    session::{QuestionOutcome, SessionState},
    utils::DocQaError,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize, Deserialize)]
pub struct NonInteractiveResult {
    /// Document the question was asked against, if one was loaded
    pub document: Option<String>,
    /// The question that was asked
    pub question: String,
    /// The backend's answer (empty on failure)
    pub answer: String,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend API root used
    pub backend: String,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Runs one upload-and-ask exchange without the TUI
pub struct NonInteractiveRunner {
    backend: Arc<dyn Backend>,
    backend_url: String,
    session: SessionState,
}

impl NonInteractiveRunner {
    pub fn new(backend: Arc<dyn Backend>, backend_url: String) -> Self {
        Self {
            backend,
            backend_url,
            session: SessionState::new(),
        }
    }

    /// Upload a PDF and make it the active document
    pub async fn load_file(&mut self, path: &Path) -> Result<DocumentHandle, DocQaError> {
        let upload = PdfUpload::from_path(path).await?;
        let handle = self.backend.ingest(&upload).await?;
        self.session.complete_ingestion(handle.clone());
        Ok(handle)
    }

    /// Use a document the backend already has
    pub fn attach(&mut self, handle: DocumentHandle) {
        self.session.complete_ingestion(handle);
    }

    /// Upload `path`, then ask `question` about it
    pub async fn run(&mut self, path: &Path, question: String) -> NonInteractiveResult {
        let start_time = Instant::now();
        match self.load_file(path).await {
            Ok(_) => self.execute(question).await,
            Err(err) => NonInteractiveResult {
                document: None,
                question,
                answer: String::new(),
                errors: vec![if err.is_validation() {
                    err.to_string()
                } else {
                    format!("Upload failed: {}", err)
                }],
                metadata: self.metadata(start_time),
            },
        }
    }

    /// Ask a question about the active document
    pub async fn execute(&mut self, question: String) -> NonInteractiveResult {
        let start_time = Instant::now();
        let mut errors = Vec::new();
        let mut answer = String::new();

        match self.session.submit_question(self.backend.as_ref(), &question).await {
            Ok(QuestionOutcome::Answered(text)) => answer = text,
            Ok(QuestionOutcome::Failed(error)) => errors.push(error),
            Ok(QuestionOutcome::Discarded) => errors.push("Answer was discarded".to_string()),
            Err(err) => errors.push(err.to_string()),
        }

        NonInteractiveResult {
            document: self.session.document().map(|h| h.to_string()),
            question,
            answer,
            errors,
            metadata: self.metadata(start_time),
        }
    }

    fn metadata(&self, start_time: Instant) -> ExecutionMetadata {
        ExecutionMetadata {
            backend: self.backend_url.clone(),
            duration_ms: start_time.elapsed().as_millis(),
        }
    }

    /// Format the result based on output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)),
            OutputFormat::Text => {
                let mut output = String::new();
                if !result.answer.is_empty() {
                    output.push_str(&result.answer);
                }
                for error in &result.errors {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                    output.push_str(&format!("{} {}", "Error:".red(), error));
                }
                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();
                if let Some(document) = &result.document {
                    output.push_str(&format!("# {}\n\n", document));
                }
                output.push_str(&format!("## Question\n\n{}\n\n", result.question));
                if !result.answer.is_empty() {
                    output.push_str(&format!("## Answer\n\n{}\n\n", result.answer));
                }
                if !result.errors.is_empty() {
                    output.push_str("## Errors\n\n");
                    for error in &result.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                    output.push('\n');
                }
                output.push_str(&format!(
                    "---\n*Backend: {} | Duration: {}ms*\n",
                    result.metadata.backend, result.metadata.duration_ms
                ));
                output
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockBackend;
    use std::io::Write;
    use tempfile::TempDir;

    const URL: &str = "http://localhost:8000/api";

    fn pdf_in(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&vec![0u8; 10 * 1024])
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_then_ask() {
        let dir = TempDir::new().unwrap();
        let path = pdf_in(&dir, "notes.pdf");
        let mut backend = MockBackend::new();
        backend
            .expect_ingest()
            .times(1)
            .returning(|upload| Ok(DocumentHandle::new(upload.file_name())));
        backend
            .expect_ask()
            .times(1)
            .returning(|_, _, _| Ok("Chapter 2 covers...".to_string()));
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), URL.to_string());

        let result = runner
            .run(&path, "What is chapter 2 about?".to_string())
            .await;

        assert_eq!(result.document.as_deref(), Some("notes.pdf"));
        assert_eq!(result.answer, "Chapter 2 covers...");
        assert!(result.errors.is_empty());
        assert_eq!(
            runner.format_result(&result, OutputFormat::Text),
            "Chapter 2 covers..."
        );
    }

    #[tokio::test]
    async fn test_invalid_file_never_reaches_backend() {
        let dir = TempDir::new().unwrap();
        let path = pdf_in(&dir, "notes.txt");
        let mut backend = MockBackend::new();
        backend.expect_ingest().times(0);
        backend.expect_ask().times(0);
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), URL.to_string());

        let result = runner.run(&path, "anything".to_string()).await;

        assert_eq!(result.errors, vec!["Please select a PDF file"]);
        assert!(result.document.is_none());
    }

    #[tokio::test]
    async fn test_rejected_upload_recorded() {
        let dir = TempDir::new().unwrap();
        let path = pdf_in(&dir, "scan.pdf");
        let mut backend = MockBackend::new();
        backend
            .expect_ingest()
            .returning(|_| Err(DocQaError::IngestionFailed("Could not extract text".to_string())));
        backend.expect_ask().times(0);
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), URL.to_string());

        let result = runner.run(&path, "anything".to_string()).await;

        assert_eq!(result.errors, vec!["Upload failed: Could not extract text"]);
    }

    #[tokio::test]
    async fn test_ask_failure_recorded() {
        let mut backend = MockBackend::new();
        backend
            .expect_ask()
            .returning(|_, _, _| Err(DocQaError::AskFailed(503)));
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), URL.to_string());
        runner.attach(DocumentHandle::new("notes.pdf"));

        let result = runner.execute("Why?".to_string()).await;

        assert!(result.answer.is_empty());
        assert_eq!(result.errors, vec!["Server error: 503"]);

        let json = runner.format_result(&result, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["document"], "notes.pdf");
        assert_eq!(value["errors"][0], "Server error: 503");
    }

    #[tokio::test]
    async fn test_markdown_output() {
        let mut backend = MockBackend::new();
        backend
            .expect_ask()
            .returning(|_, _, _| Ok("It is about **RAG**.".to_string()));
        let mut runner = NonInteractiveRunner::new(Arc::new(backend), URL.to_string());
        runner.attach(DocumentHandle::new("notes.pdf"));

        let result = runner.execute("Topic?".to_string()).await;
        let output = runner.format_result(&result, OutputFormat::Markdown);

        assert!(output.starts_with("# notes.pdf\n\n## Question\n\nTopic?"));
        assert!(output.contains("## Answer\n\nIt is about **RAG**."));
        assert!(!output.contains("## Errors"));
    }
}
