//! Upload history
//!
//! Keeps the most recent submissions in memory with a JSON file on disk so
//! the `history` command and the duplicate-upload warning survive restarts.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{UploadMode, UploadReport};

const MAX_HISTORY_SIZE: usize = 100;
pub const HISTORY_FILE_NAME: &str = "history.json";

/// One submission in history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadHistoryEntry {
    pub id: Uuid,
    pub file_name: String,
    /// SHA-256 of the uploaded bytes, hex encoded
    pub digest: String,
    pub mode: UploadMode,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_rows: u32,
    pub created: u32,
    pub rejected: u32,
    pub error: Option<String>,
}

/// Hex SHA-256 of an upload file
pub fn file_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Submission history backed by an in-memory deque and a JSON file
pub struct UploadHistory {
    path: Option<PathBuf>,
    entries: RwLock<VecDeque<UploadHistoryEntry>>,
}

impl UploadHistory {
    /// Open the history stored at `path`, starting empty when it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut deque = VecDeque::with_capacity(MAX_HISTORY_SIZE);
        if let Some(loaded) = Self::load_from_disk(&path) {
            deque.extend(loaded.into_iter().take(MAX_HISTORY_SIZE));
            info!("Loaded {} upload history entries from {}", deque.len(), path.display());
        }
        Self {
            path: Some(path),
            entries: RwLock::new(deque),
        }
    }

    /// History that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(VecDeque::with_capacity(MAX_HISTORY_SIZE)),
        }
    }

    /// Most recent earlier upload of the same bytes that reached the backend
    pub fn find_previous(&self, digest: &str) -> Option<UploadHistoryEntry> {
        self.entries
            .read()
            .iter()
            .find(|e| e.digest == digest && e.status == "completed")
            .cloned()
    }

    pub fn record_completed(&self, digest: &str, started_at: DateTime<Utc>, report: &UploadReport) {
        let completed_at = Utc::now();
        self.add_entry(UploadHistoryEntry {
            id: report.upload_id,
            file_name: report.file_name.clone(),
            digest: digest.to_string(),
            mode: report.mode,
            status: "completed".to_string(),
            started_at,
            completed_at,
            duration_ms: duration_ms(started_at, completed_at),
            total_rows: report.total_rows,
            created: report.outcome.created_profiles_count,
            rejected: report.outcome.rejected_profiles_count,
            error: None,
        });
    }

    pub fn record_failed(
        &self,
        file_name: &str,
        digest: &str,
        mode: UploadMode,
        started_at: DateTime<Utc>,
        error: String,
    ) {
        let completed_at = Utc::now();
        self.add_entry(UploadHistoryEntry {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            digest: digest.to_string(),
            mode,
            status: "failed".to_string(),
            started_at,
            completed_at,
            duration_ms: duration_ms(started_at, completed_at),
            total_rows: 0,
            created: 0,
            rejected: 0,
            error: Some(error),
        });
    }

    /// Newest first
    pub fn recent(&self, limit: usize) -> Vec<UploadHistoryEntry> {
        self.entries.read().iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn add_entry(&self, entry: UploadHistoryEntry) {
        let mut entries = self.entries.write();

        if entries.len() >= MAX_HISTORY_SIZE {
            entries.pop_back();
        }
        entries.push_front(entry);

        if let Some(path) = &self.path {
            Self::save_to_disk(path, &entries);
        }
    }

    fn load_from_disk(path: &Path) -> Option<Vec<UploadHistoryEntry>> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<UploadHistoryEntry>>(&content) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!("Failed to parse upload history file: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read upload history file: {}", e);
                None
            }
        }
    }

    fn save_to_disk(path: &Path, entries: &VecDeque<UploadHistoryEntry>) {
        if let Some(dir) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("Failed to create upload history directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!("Failed to write upload history file: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize upload history: {}", e),
        }
    }
}

fn duration_ms(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> u64 {
    (completed_at - started_at).num_milliseconds().max(0) as u64
}
