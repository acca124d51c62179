use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::Config;
use crate::gateway::{Backend, DocumentHandle, SelectedFile};
use crate::session::{PendingQuestion, SessionState};
use crate::utils::DocQaError;

/// State of the file picker shown while no document is loaded
#[derive(Debug, Default)]
pub struct UploadPanel {
    /// Path typed by the user
    pub path_input: String,
    /// File that passed validation, if any
    pub selected: Option<SelectedFile>,
    /// An upload is in flight
    pub is_uploading: bool,
    /// Error banner text
    pub error: Option<String>,
}

/// Keyboard focus on the chat screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Typing a question
    Insert,
    /// Scrolling the transcript
    Normal,
    /// Typing a `:` command
    Command,
}

/// Work the event loop has to run off the UI thread
#[derive(Debug)]
pub enum Task {
    Inspect(PathBuf),
    Upload(SelectedFile),
    Ask(PendingQuestion),
}

/// Results sent back to the event loop by spawned tasks
#[derive(Debug)]
pub enum BackendEvent {
    Selected {
        path: PathBuf,
        result: Result<SelectedFile, DocQaError>,
    },
    Ingested(Result<DocumentHandle, DocQaError>),
    Answered {
        epoch: u64,
        outcome: Result<String, DocQaError>,
    },
}

/// Application state
pub struct App {
    /// Document, transcript and awaiting flag
    pub session: SessionState,
    /// Backend used by spawned tasks
    pub backend: Arc<dyn Backend>,
    pub config: Config,
    /// Shown in the header
    pub backend_url: String,
    pub upload: UploadPanel,
    /// Question (or command) being typed
    pub input: String,
    pub input_mode: InputMode,
    /// Is the app running?
    pub running: bool,
    /// Lines scrolled up from the bottom of the transcript
    pub scroll_offset: u16,
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new app instance
    pub fn new(backend: Arc<dyn Backend>, config: Config, backend_url: String) -> Self {
        Self {
            session: SessionState::new(),
            backend,
            config,
            backend_url,
            upload: UploadPanel::default(),
            input: String::new(),
            input_mode: InputMode::Insert,
            running: true,
            scroll_offset: 0,
            show_help: false,
            status_message: None,
        }
    }

    /// True while the upload screen is showing
    pub fn on_upload_screen(&self) -> bool {
        self.session.document().is_none()
    }

    /// Edit the path field; any previous selection no longer applies
    pub fn push_path_char(&mut self, c: char) {
        if self.upload.is_uploading {
            return;
        }
        self.upload.path_input.push(c);
        self.upload.selected = None;
    }

    pub fn pop_path_char(&mut self) {
        if self.upload.is_uploading {
            return;
        }
        self.upload.path_input.pop();
        self.upload.selected = None;
    }

    /// Enter on the upload screen: select the typed path, or upload it if it
    /// is already selected
    pub fn confirm_path(&mut self) -> Option<Task> {
        if self.upload.is_uploading {
            return None;
        }
        let path = PathBuf::from(self.upload.path_input.trim());
        if path.as_os_str().is_empty() {
            self.upload.error = Some(DocQaError::NoFileSelected.to_string());
            return None;
        }
        let already_selected = self
            .upload
            .selected
            .as_ref()
            .is_some_and(|selected| selected.path() == path.as_path());
        if already_selected {
            return self.start_upload();
        }
        self.upload.error = None;
        Some(Task::Inspect(path))
    }

    /// Begin uploading the selected file
    pub fn start_upload(&mut self) -> Option<Task> {
        if self.upload.is_uploading {
            return None;
        }
        let Some(selected) = self.upload.selected.clone() else {
            self.upload.error = Some(DocQaError::NoFileSelected.to_string());
            return None;
        };
        self.upload.is_uploading = true;
        self.upload.error = None;
        Some(Task::Upload(selected))
    }

    /// Whether Enter would send right now
    pub fn can_send(&self) -> bool {
        !self.input.trim().is_empty() && !self.session.is_awaiting_response()
    }

    /// Enter on the chat screen
    pub fn send_input(&mut self) -> Option<Task> {
        if !self.can_send() {
            return None;
        }
        match self.session.begin_question(&self.input) {
            Ok(pending) => {
                self.input.clear();
                self.scroll_offset = 0;
                self.clear_status();
                Some(Task::Ask(pending))
            }
            Err(err) => {
                self.set_status(err.to_string());
                None
            }
        }
    }

    /// Apply a finished task to the state
    pub fn apply(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Selected { path, result } => {
                // The path may have been edited while the check ran
                if path.as_path() != Path::new(self.upload.path_input.trim()) {
                    return;
                }
                match result {
                    Ok(selected) => {
                        self.upload.error = None;
                        self.upload.selected = Some(selected);
                    }
                    Err(err) => {
                        self.upload.selected = None;
                        self.upload.error = Some(err.to_string());
                    }
                }
            }
            BackendEvent::Ingested(result) => {
                // A reset can't happen mid-upload: the upload screen has no reset
                self.upload.is_uploading = false;
                match result {
                    Ok(handle) => {
                        self.session.complete_ingestion(handle);
                        self.upload = UploadPanel::default();
                        self.input.clear();
                        self.input_mode = InputMode::Insert;
                        self.scroll_offset = 0;
                    }
                    Err(err) if err.is_validation() => {
                        self.upload.error = Some(err.to_string());
                    }
                    Err(err) => {
                        self.upload.error = Some(format!("Upload failed: {}", err));
                    }
                }
            }
            BackendEvent::Answered { epoch, outcome } => {
                self.session.finish_question(epoch, outcome);
                self.scroll_offset = 0;
            }
        }
    }

    /// Drop the current document and go back to the upload screen
    pub fn change_file(&mut self) {
        self.session.reset();
        self.upload = UploadPanel::default();
        self.input.clear();
        self.input_mode = InputMode::Insert;
        self.scroll_offset = 0;
        self.clear_status();
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Scroll chat view up
    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MessageRole, MockBackend};
    use std::io::Write;
    use tempfile::TempDir;

    fn app() -> App {
        App::new(
            Arc::new(MockBackend::new()),
            Config::default(),
            "http://localhost:8000/api".to_string(),
        )
    }

    fn chatting(name: &str) -> App {
        let mut app = app();
        app.apply(BackendEvent::Ingested(Ok(DocumentHandle::new(name))));
        app
    }

    async fn selected_pdf(dir: &TempDir) -> SelectedFile {
        let path = dir.path().join("notes.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();
        SelectedFile::inspect(&path).await.unwrap()
    }

    #[test]
    fn test_starts_on_upload_screen() {
        let app = app();
        assert!(app.on_upload_screen());
        assert!(app.session.transcript().is_empty());
    }

    #[test]
    fn test_empty_path_shows_error() {
        let mut app = app();
        assert!(app.confirm_path().is_none());
        assert_eq!(app.upload.error.as_deref(), Some("Please select a file first"));
    }

    #[test]
    fn test_typed_path_is_inspected_first() {
        let mut app = app();
        for c in "notes.pdf".chars() {
            app.push_path_char(c);
        }
        match app.confirm_path() {
            Some(Task::Inspect(path)) => assert_eq!(path, PathBuf::from("notes.pdf")),
            other => panic!("expected inspect, got {:?}", other),
        }
        assert!(!app.upload.is_uploading);
    }

    fn selection_of(path: &str, result: Result<SelectedFile, DocQaError>) -> BackendEvent {
        BackendEvent::Selected {
            path: PathBuf::from(path),
            result,
        }
    }

    #[test]
    fn test_rejected_selection_shows_banner() {
        let mut app = app();
        app.upload.path_input = "notes.txt".to_string();
        app.apply(selection_of("notes.txt", Err(DocQaError::InvalidFileType)));
        assert!(app.upload.selected.is_none());
        assert_eq!(app.upload.error.as_deref(), Some("Please select a PDF file"));
        assert!(app.start_upload().is_none());
    }

    #[tokio::test]
    async fn test_second_enter_uploads_selected_file() {
        let dir = TempDir::new().unwrap();
        let selected = selected_pdf(&dir).await;
        let mut app = app();
        app.upload.path_input = selected.path().display().to_string();
        app.apply(BackendEvent::Selected {
            path: selected.path().to_path_buf(),
            result: Ok(selected),
        });

        assert!(matches!(app.confirm_path(), Some(Task::Upload(_))));
        assert!(app.upload.is_uploading);

        // No second upload while the first is running
        assert!(app.confirm_path().is_none());
        assert!(app.start_upload().is_none());
    }

    #[tokio::test]
    async fn test_editing_path_drops_selection() {
        let dir = TempDir::new().unwrap();
        let selected = selected_pdf(&dir).await;
        let mut app = app();
        app.upload.path_input = selected.path().display().to_string();
        app.apply(BackendEvent::Selected {
            path: selected.path().to_path_buf(),
            result: Ok(selected),
        });
        assert!(app.upload.selected.is_some());
        app.push_path_char('x');
        assert!(app.upload.selected.is_none());
    }

    #[tokio::test]
    async fn test_outdated_selection_result_is_ignored() {
        let dir = TempDir::new().unwrap();
        let selected = selected_pdf(&dir).await;
        let mut app = app();
        app.upload.path_input = "other.docx".to_string();
        app.apply(selection_of("other.docx", Err(DocQaError::InvalidFileType)));

        // A check for the previously typed path finishes late
        app.apply(BackendEvent::Selected {
            path: selected.path().to_path_buf(),
            result: Ok(selected),
        });
        assert!(app.upload.selected.is_none());
        assert_eq!(app.upload.error.as_deref(), Some("Please select a PDF file"));

        // And the reverse: a late failure does not clear a current selection
        let current = selected_pdf(&dir).await;
        app.upload.path_input = current.path().display().to_string();
        app.apply(BackendEvent::Selected {
            path: current.path().to_path_buf(),
            result: Ok(current),
        });
        app.apply(selection_of("other.docx", Err(DocQaError::InvalidFileType)));
        assert!(app.upload.selected.is_some());
        assert!(app.upload.error.is_none());
    }

    #[test]
    fn test_failed_upload_keeps_upload_screen() {
        let mut app = app();
        app.upload.is_uploading = true;
        app.apply(BackendEvent::Ingested(Err(DocQaError::IngestionFailed(
            "Only PDF files are allowed".to_string(),
        ))));

        assert!(app.on_upload_screen());
        assert!(!app.upload.is_uploading);
        assert_eq!(
            app.upload.error.as_deref(),
            Some("Upload failed: Only PDF files are allowed")
        );
    }

    #[test]
    fn test_file_changed_before_upload_shows_plain_error() {
        let mut app = app();
        app.upload.is_uploading = true;
        app.apply(BackendEvent::Ingested(Err(DocQaError::FileTooLarge)));
        assert_eq!(
            app.upload.error.as_deref(),
            Some("File size must be less than 50MB")
        );
    }

    #[test]
    fn test_successful_upload_opens_chat() {
        let app = chatting("notes.pdf");
        assert!(!app.on_upload_screen());
        let transcript = app.session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, MessageRole::Assistant);
        assert!(transcript[0].content.contains("notes.pdf"));
    }

    #[test]
    fn test_send_disabled_while_waiting() {
        let mut app = chatting("notes.pdf");
        app.input = "first?".to_string();
        assert!(matches!(app.send_input(), Some(Task::Ask(_))));
        assert!(app.input.is_empty());

        app.input = "second?".to_string();
        assert!(!app.can_send());
        assert!(app.send_input().is_none());
        assert_eq!(app.input, "second?");
        assert_eq!(app.session.transcript().len(), 2);
    }

    #[test]
    fn test_blank_input_not_sent() {
        let mut app = chatting("notes.pdf");
        app.input = "   ".to_string();
        assert!(app.send_input().is_none());
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn test_answer_event_completes_exchange() {
        let mut app = chatting("notes.pdf");
        app.input = "What is chapter 2 about?".to_string();
        let Some(Task::Ask(pending)) = app.send_input() else {
            panic!("expected ask task");
        };

        app.apply(BackendEvent::Answered {
            epoch: pending.epoch,
            outcome: Ok("Chapter 2 covers...".to_string()),
        });

        let transcript = app.session.transcript();
        assert_eq!(transcript.last().unwrap().content, "Chapter 2 covers...");
        assert!(!app.can_send());
        assert!(!app.session.is_awaiting_response());
    }

    #[test]
    fn test_change_file_mid_flight_ignores_late_answer() {
        let mut app = chatting("notes.pdf");
        app.input = "slow?".to_string();
        let Some(Task::Ask(pending)) = app.send_input() else {
            panic!("expected ask task");
        };

        app.change_file();
        assert!(app.on_upload_screen());

        app.apply(BackendEvent::Answered {
            epoch: pending.epoch,
            outcome: Ok("too late".to_string()),
        });
        assert!(app.session.transcript().is_empty());
        assert!(app.on_upload_screen());
    }
}
