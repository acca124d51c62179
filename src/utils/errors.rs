use thiserror::Error;

/// Main error type for docqa
#[derive(Error, Debug)]
pub enum DocQaError {
    #[error("Please select a PDF file")]
    InvalidFileType,

    #[error("File size must be less than 50MB")]
    FileTooLarge,

    #[error("Please select a file first")]
    NoFileSelected,

    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("Please upload a PDF first!")]
    NoActiveDocument,

    #[error("Still waiting for the previous answer")]
    QuestionInFlight,

    #[error("{0}")]
    IngestionFailed(String),

    #[error("Server error: {0}")]
    AskFailed(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocQaError {
    /// True for errors raised before any request leaves the client
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileType
                | Self::FileTooLarge
                | Self::NoFileSelected
                | Self::EmptyQuestion
                | Self::NoActiveDocument
                | Self::QuestionInFlight
        )
    }
}

impl From<reqwest::Error> for DocQaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_ui_text() {
        assert_eq!(DocQaError::InvalidFileType.to_string(), "Please select a PDF file");
        assert_eq!(DocQaError::FileTooLarge.to_string(), "File size must be less than 50MB");
        assert_eq!(DocQaError::AskFailed(500).to_string(), "Server error: 500");
        assert_eq!(
            DocQaError::IngestionFailed("bad pdf".to_string()).to_string(),
            "bad pdf"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(DocQaError::NoActiveDocument.is_validation());
        assert!(DocQaError::QuestionInFlight.is_validation());
        assert!(!DocQaError::AskFailed(502).is_validation());
        assert!(!DocQaError::Network("refused".to_string()).is_validation());
    }
}
