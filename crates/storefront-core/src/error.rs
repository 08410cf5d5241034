//! Error types module
//!
//! Every failure in the ingestion pipeline is caught where it happens and turned
//! into one of these variants. The `Display` text of the controller-facing
//! variants is the message shown to the administrator.

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The object store rejected the file or could not be reached.
    #[error("upload failed")]
    UploadFailure(#[source] anyhow::Error),

    /// The object was uploaded but the backend did not record its URL.
    /// The uploaded object is not rolled back.
    #[error("failed to save reference")]
    PersistFailure(#[source] anyhow::Error),

    /// The backend refused to append a confirmed URL to the feature list.
    #[error("failed to add feature image: {0}")]
    CommitFailure(String),

    /// The feature list could not be fetched; the cached list is kept.
    #[error("failed to load feature images: {0}")]
    RefreshFailure(String),

    /// A commit was requested while no confirmed URL is available.
    #[error("no uploaded image to add, upload an image first")]
    NothingToCommit,

    /// The candidate file breaks the upload policy (size, content type).
    #[error("{0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Whether retrying the same operation can succeed without user changes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IngestError::UploadFailure(_)
                | IngestError::PersistFailure(_)
                | IngestError::CommitFailure(_)
                | IngestError::RefreshFailure(_)
        )
    }

    /// Machine-readable error code, used as a structured log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::UploadFailure(_) => "UPLOAD_FAILURE",
            IngestError::PersistFailure(_) => "PERSIST_FAILURE",
            IngestError::CommitFailure(_) => "COMMIT_FAILURE",
            IngestError::RefreshFailure(_) => "REFRESH_FAILURE",
            IngestError::NothingToCommit => "NOTHING_TO_COMMIT",
            IngestError::InvalidInput(_) => "INVALID_INPUT",
            IngestError::Config(_) => "CONFIG_ERROR",
        }
    }
}
