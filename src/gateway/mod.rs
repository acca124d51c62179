// Gateway module for the backend API - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod http;
mod traits;
mod types;
mod upload;

// Public re-exports - the ONLY way to access backend functionality
pub use http::HttpBackend;
pub use traits::Backend;
#[cfg(test)]
pub use traits::MockBackend;
pub use types::{
    AskRequest, AskResponse, ChatMessage, DocumentHandle, ErrorBody, MessageRole,
    StatusResponse, UploadResponse,
};
pub use upload::{validate_pdf, PdfUpload, SelectedFile};
