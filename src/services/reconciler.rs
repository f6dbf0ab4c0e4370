//! Bulk submission and outcome reconciliation
//!
//! One [`BulkUploader`] runs at most one submission at a time. Each
//! submission decodes the file, optionally validates it locally, sends a
//! single request and checks the backend's summary against the rows that
//! were actually sent.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::UploadError;
use crate::services::csv_decoder;
use crate::services::row_transformer::{self, TransformOptions};
use crate::services::upload_client::UploadBackend;
use crate::types::{BulkUploadOutcome, UploadMode, UploadReport, UploadStatus, UploadStatusUpdate};

/// File to submit plus how to submit it
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mode: UploadMode,
    pub options: TransformOptions,
}

/// Clears the in-flight flag when the submission ends or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BulkUploader {
    backend: Arc<dyn UploadBackend>,
    in_flight: AtomicBool,
    status_tx: Option<mpsc::UnboundedSender<UploadStatusUpdate>>,
}

impl BulkUploader {
    pub fn new(backend: Arc<dyn UploadBackend>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
            status_tx: None,
        }
    }

    /// Publish progress milestones on `tx`
    pub fn with_status_channel(mut self, tx: mpsc::UnboundedSender<UploadStatusUpdate>) -> Self {
        self.status_tx = Some(tx);
        self
    }

    /// Run one submission. Rejected rows are part of a successful report;
    /// only decode, local validation, auth and transport problems are errors.
    pub async fn submit(&self, request: UploadRequest) -> Result<UploadReport, UploadError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(UploadError::InProgress)?;

        let upload_id = Uuid::new_v4();
        info!(
            "Upload {} started: {} ({} bytes, {} mode, via {})",
            upload_id,
            request.file_name,
            request.bytes.len(),
            request.mode,
            self.backend.name()
        );

        match self.run(upload_id, request).await {
            Ok(report) => {
                info!(
                    "Upload {} finished: {} created, {} rejected",
                    upload_id, report.outcome.created_profiles_count, report.outcome.rejected_profiles_count
                );
                self.emit(
                    upload_id,
                    UploadStatus::Done {
                        created: report.outcome.created_profiles_count,
                        rejected: report.outcome.rejected_profiles_count,
                    },
                );
                Ok(report)
            }
            Err(e) => {
                error!("Upload {} failed: {}", upload_id, e);
                self.emit(upload_id, UploadStatus::Failed { error: e.to_string() });
                Err(e)
            }
        }
    }

    async fn run(&self, upload_id: Uuid, request: UploadRequest) -> Result<UploadReport, UploadError> {
        let UploadRequest { file_name, bytes, mode, options } = request;

        self.emit(upload_id, UploadStatus::Decoding);
        let rows = csv_decoder::decode(&bytes)?.collect_rows()?;
        let total_rows = rows.len() as u32;

        let report = |outcome: BulkUploadOutcome, discrepancies: Vec<String>| UploadReport {
            upload_id,
            file_name: file_name.clone(),
            mode,
            total_rows,
            outcome,
            discrepancies,
        };

        if rows.is_empty() {
            info!("Upload {}: file has no data rows, nothing sent", upload_id);
            return Ok(report(BulkUploadOutcome::default(), Vec::new()));
        }

        let outcome = match mode {
            UploadMode::Server => {
                drop(rows);
                self.emit(upload_id, UploadStatus::Sending { rows: total_rows });
                self.send(upload_id, self.backend.upload_file(&file_name, bytes)).await?
            }
            UploadMode::Local => {
                self.emit(upload_id, UploadStatus::Validating { rows: total_rows });
                let validation = row_transformer::validate_rows(rows, &options);
                if !validation.is_valid() {
                    warn!(
                        "Upload {}: {} validation error(s), nothing sent",
                        upload_id,
                        validation.errors.len()
                    );
                    return Err(UploadError::Validation(validation.errors));
                }

                debug!("Upload {}: {} drafts passed local validation", upload_id, validation.drafts.len());
                self.emit(upload_id, UploadStatus::Sending { rows: validation.drafts.len() as u32 });
                self.send(upload_id, self.backend.submit_drafts(&validation.drafts)).await?
            }
        };

        let discrepancies = check_consistency(&outcome, total_rows);
        for d in &discrepancies {
            warn!("Upload {}: inconsistent backend summary: {}", upload_id, d);
        }

        Ok(report(outcome, discrepancies))
    }

    /// Drive the backend call. `AwaitingResponse` is emitted once the call has
    /// handed off the request and is waiting; a call that completes on its
    /// first poll goes straight to the outcome.
    async fn send<F>(&self, upload_id: Uuid, call: F) -> Result<BulkUploadOutcome, UploadError>
    where
        F: Future<Output = Result<BulkUploadOutcome, UploadError>>,
    {
        tokio::pin!(call);
        tokio::select! {
            biased;
            result = &mut call => return result,
            _ = std::future::ready(()) => {}
        }

        debug!("Upload {}: request in flight", upload_id);
        self.emit(upload_id, UploadStatus::AwaitingResponse);
        call.await
    }

    fn emit(&self, upload_id: Uuid, status: UploadStatus) {
        if let Some(tx) = &self.status_tx {
            // Receiver gone just means nobody is watching
            let _ = tx.send(UploadStatusUpdate::new(upload_id, status));
        }
    }
}

/// Compare the backend summary with the number of rows that were sent.
/// Returns one message per mismatch; the outcome itself is never changed.
pub fn check_consistency(outcome: &BulkUploadOutcome, total_rows: u32) -> Vec<String> {
    let mut problems = Vec::new();

    let counted = outcome.created_profiles_count as u64 + outcome.rejected_profiles_count as u64;
    if counted != total_rows as u64 {
        problems.push(format!(
            "{} created + {} rejected = {}, but {} rows were sent",
            outcome.created_profiles_count, outcome.rejected_profiles_count, counted, total_rows
        ));
    }

    if outcome.rejected_profiles.len() != outcome.rejected_profiles_count as usize {
        problems.push(format!(
            "rejected count is {} but {} rejections were listed",
            outcome.rejected_profiles_count,
            outcome.rejected_profiles.len()
        ));
    }

    let mut seen = HashSet::new();
    for rejected in &outcome.rejected_profiles {
        let n = rejected.invalid_record_number;
        if n == 0 || n > total_rows {
            problems.push(format!("rejected record {} is outside 1..={}", n, total_rows));
        }
        if !seen.insert(n) {
            problems.push(format!("record {} is rejected more than once", n));
        }
    }

    problems
}
