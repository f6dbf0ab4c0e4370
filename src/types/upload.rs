//! Bulk upload types: validation errors, backend outcome, modes and progress

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// VALIDATION
// =============================================================================

/// Missing required value on one row of a local validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// 1-based position among data rows (header excluded)
    pub row_index: usize,
    /// CSV header of the offending column
    pub field_name: String,
    pub message: String,
}

impl ValidationError {
    pub fn missing_value(row_index: usize, field_name: &str) -> Self {
        Self {
            row_index,
            field_name: field_name.to_string(),
            message: format!("Row {}: Missing value for \"{}\".", row_index, field_name),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// BACKEND OUTCOME
// =============================================================================

/// Per-record rejection reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedProfile {
    pub invalid_record_number: u32,
    pub errors: String,
}

/// Summary of one bulk submission as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadOutcome {
    pub created_profiles_count: u32,
    pub rejected_profiles_count: u32,
    #[serde(default)]
    pub rejected_profiles: Vec<RejectedProfile>,
}

/// Response envelope used by every talent backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// JSON body for the local-validate submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest<'a> {
    pub profiles: &'a [super::TalentProfileDraft],
}

// =============================================================================
// POLICIES
// =============================================================================

/// How a bulk upload is validated and submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Validate every row locally, abort on any error, then send the drafts
    Local,
    /// Send the raw file and let the backend accept or reject each row
    #[default]
    Server,
}

/// Which columns must carry a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredPolicy {
    /// Identity columns only (first name, last name, email)
    #[default]
    Relaxed,
    /// Every scalar template column
    Legacy,
}

/// How comma-joined list cells are split into tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListTokenPolicy {
    /// Keep tokens exactly as written, surrounding spaces included
    #[default]
    Verbatim,
    /// Trim tokens and drop the empty ones
    Trim,
}

impl UploadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMode::Local => "local",
            UploadMode::Server => "server",
        }
    }
}

impl RequiredPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredPolicy::Relaxed => "relaxed",
            RequiredPolicy::Legacy => "legacy",
        }
    }
}

impl ListTokenPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListTokenPolicy::Verbatim => "verbatim",
            ListTokenPolicy::Trim => "trim",
        }
    }
}

fn unknown_value(value: &str, expected: &[&str]) -> String {
    format!("unknown value '{}' (expected one of: {})", value, expected.join(", "))
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(UploadMode::Local),
            "server" => Ok(UploadMode::Server),
            other => Err(unknown_value(other, &["local", "server"])),
        }
    }
}

impl FromStr for RequiredPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relaxed" => Ok(RequiredPolicy::Relaxed),
            "legacy" => Ok(RequiredPolicy::Legacy),
            other => Err(unknown_value(other, &["relaxed", "legacy"])),
        }
    }
}

impl FromStr for ListTokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbatim" => Ok(ListTokenPolicy::Verbatim),
            "trim" => Ok(ListTokenPolicy::Trim),
            other => Err(unknown_value(other, &["verbatim", "trim"])),
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RequiredPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ListTokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

/// Coarse milestones of a single submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UploadStatus {
    Decoding,
    #[serde(rename_all = "camelCase")]
    Validating { rows: u32 },
    #[serde(rename_all = "camelCase")]
    Sending { rows: u32 },
    AwaitingResponse,
    #[serde(rename_all = "camelCase")]
    Done { created: u32, rejected: u32 },
    #[serde(rename_all = "camelCase")]
    Failed { error: String },
}

/// Progress message published while a submission runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatusUpdate {
    pub upload_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: UploadStatus,
}

impl UploadStatusUpdate {
    pub fn new(upload_id: Uuid, status: UploadStatus) -> Self {
        Self {
            upload_id,
            timestamp: Utc::now(),
            status,
        }
    }
}

/// Result of a successful submission, handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub upload_id: Uuid,
    pub file_name: String,
    pub mode: UploadMode,
    /// Data rows counted by the local decoder
    pub total_rows: u32,
    pub outcome: BulkUploadOutcome,
    /// Mismatches between the outcome and the submitted rows, if any
    #[serde(default)]
    pub discrepancies: Vec<String>,
}
