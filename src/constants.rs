/// Constants module to avoid magic numbers in the codebase

// Backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const UPLOAD_ENDPOINT: &str = "upload";
pub const ASK_ENDPOINT: &str = "ask";
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const PDF_MIME_TYPE: &str = "application/pdf";

// Upload limits
pub const PDF_EXTENSION: &str = ".pdf";
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024; // 50 MiB

// Status probe gets its own short timeout so `docqa status` never hangs
pub const STATUS_TIMEOUT_MS: u64 = 2000;

// UI Configuration
pub const UI_POLL_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;
pub const UI_DEFAULT_VIEWPORT_HEIGHT: u16 = 20;
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

// Transcript text
pub const FAILURE_PREFIX: &str = "❌ Error:";
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "What are the main topics covered?",
    "Explain [concept] in simple terms",
    "Summarize chapter [X]",
];
