//! Talent backend client
//!
//! Uses the HTTP backend in production and a scripted mock in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::UploadError;
use crate::services::credentials::CredentialProvider;
use crate::types::{ApiEnvelope, BulkCreateRequest, BulkUploadOutcome, TalentProfileDraft};

/// Multipart field the backend reads the file from
pub const BULK_FILE_FIELD: &str = "bulkFile";
pub const BULK_UPLOAD_PATH: &str = "/talent-profiles/bulkUpload";
pub const BULK_CREATE_PATH: &str = "/talent-profiles/bulkCreate";

const AUTH_EXPIRED_CODE: i64 = 401;
const MAX_ERROR_BODY: usize = 500;

/// Talent backend abstraction (HTTP, mock)
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Send the raw CSV file; the backend validates each row itself
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<BulkUploadOutcome, UploadError>;

    /// Send drafts that already passed local validation
    async fn submit_drafts(&self, drafts: &[TalentProfileDraft]) -> Result<BulkUploadOutcome, UploadError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// HTTP client for the talent backend
pub struct HttpUploadBackend {
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpUploadBackend {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("talent-ingest/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<BulkUploadOutcome, UploadError> {
        let token = self.credentials.bearer_token()?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend answered HTTP 401, dropping credentials");
            self.credentials.invalidate();
            return Err(UploadError::AuthExpired);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let envelope: ApiEnvelope<BulkUploadOutcome> = serde_json::from_str(&body)
            .map_err(|e| UploadError::InvalidResponse(format!("{}: {}", e, truncate(&body, MAX_ERROR_BODY))))?;

        if envelope.code == AUTH_EXPIRED_CODE {
            warn!("Backend answered code 401, dropping credentials");
            self.credentials.invalidate();
            return Err(UploadError::AuthExpired);
        }

        if !envelope.is_success() {
            return Err(UploadError::Backend {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }

        envelope
            .data
            .ok_or_else(|| UploadError::InvalidResponse("success response without data".to_string()))
    }
}

#[async_trait]
impl UploadBackend for HttpUploadBackend {
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<BulkUploadOutcome, UploadError> {
        let url = self.url(BULK_UPLOAD_PATH);
        debug!("POST {} ({} bytes, file {})", url, bytes.len(), file_name);

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part(BULK_FILE_FIELD, part);

        self.execute(self.client.post(&url).multipart(form)).await
    }

    async fn submit_drafts(&self, drafts: &[TalentProfileDraft]) -> Result<BulkUploadOutcome, UploadError> {
        let url = self.url(BULK_CREATE_PATH);
        debug!("POST {} ({} profiles)", url, drafts.len());

        let body = BulkCreateRequest { profiles: drafts };
        self.execute(self.client.post(&url).json(&body)).await
    }

    fn name(&self) -> &str {
        "HttpUpload"
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
