use std::io;
use std::path::{Path, PathBuf};

use crate::constants::{MAX_UPLOAD_BYTES, PDF_EXTENSION};
use crate::utils::DocQaError;

/// Check a file name and size against the upload rules.
/// Runs before any bytes are read and before the backend is contacted.
pub fn validate_pdf(file_name: &str, size: u64) -> Result<(), DocQaError> {
    if !file_name.to_lowercase().ends_with(PDF_EXTENSION) {
        return Err(DocQaError::InvalidFileType);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(DocQaError::FileTooLarge);
    }
    Ok(())
}

/// A file the user picked, validated from filesystem metadata
#[derive(Debug, Clone)]
pub struct SelectedFile {
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl SelectedFile {
    /// Inspect a path without reading its contents
    pub async fn inspect(path: impl AsRef<Path>) -> Result<Self, DocQaError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or(DocQaError::InvalidFileType)?;

        // Extension first: a wrong file type is reported even if it doesn't exist
        validate_pdf(&file_name, 0)?;

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(DocQaError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            )));
        }
        validate_pdf(&file_name, metadata.len())?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Size formatted for display, e.g. `0.01 MB`
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }

    /// Read the file into an upload. The length is re-checked since the file
    /// may have changed after it was selected.
    pub async fn read(&self) -> Result<PdfUpload, DocQaError> {
        let bytes = tokio::fs::read(&self.path).await?;
        PdfUpload::new(self.file_name.clone(), bytes)
    }
}

/// PDF bytes ready to send to the ingestion endpoint
#[derive(Debug, Clone)]
pub struct PdfUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl PdfUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocQaError> {
        let file_name = file_name.into();
        validate_pdf(&file_name, bytes.len() as u64)?;
        Ok(Self { file_name, bytes })
    }

    /// Select, validate and read a file in one step
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DocQaError> {
        SelectedFile::inspect(path).await?.read().await
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
