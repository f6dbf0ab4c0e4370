//! Error types for the bulk upload pipeline

use thiserror::Error;

use crate::types::ValidationError;

/// Structural CSV problem; aborts decoding at the offending line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("CSV line {line}: {kind}")]
pub struct DecodeError {
    /// 1-based physical line in the file
    pub line: u64,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(line: u64, kind: DecodeErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("file is not valid UTF-8")]
    InvalidUtf8,

    #[error("header row is missing")]
    MissingHeader,

    #[error("duplicate header \"{0}\"")]
    DuplicateHeader(String),

    #[error("quoted field is never closed")]
    UnterminatedQuote,

    #[error("expected at most {expected} fields, found {found}")]
    TooManyFields { expected: usize, found: usize },

    #[error("{0}")]
    Malformed(String),
}

/// Failure of a whole upload attempt
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{} row error(s) found, nothing was submitted", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("a submission is already in progress")]
    InProgress,

    #[error("no API token configured")]
    MissingCredentials,

    #[error("authentication expired, sign in again")]
    AuthExpired,

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend rejected the request (code {code}): {message}")]
    Backend { code: i64, message: String },

    #[error("unexpected backend response: {0}")]
    InvalidResponse(String),

    #[error("cannot read upload file: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Failures where no outcome exists and the user should simply retry
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UploadError::Transport(_)
                | UploadError::Status { .. }
                | UploadError::Backend { .. }
                | UploadError::InvalidResponse(_)
        )
    }

    /// Single line shown to the person who triggered the upload
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Decode(e) => format!("The file could not be read as CSV ({}).", e),
            UploadError::Validation(errors) => format!(
                "The file has {} problem(s); fix them and upload again.",
                errors.len()
            ),
            UploadError::InProgress => {
                "An upload is already in progress; wait for it to finish.".to_string()
            }
            UploadError::MissingCredentials | UploadError::AuthExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            UploadError::Io(e) => format!("The file could not be opened ({}).", e),
            _ => "Something went wrong while uploading. Please try again.".to_string(),
        }
    }
}
