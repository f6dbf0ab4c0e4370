//! `upload` and `history` commands

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::UploadError;
use crate::handlers::report;
use crate::services::credentials::StaticTokenProvider;
use crate::services::reconciler::{BulkUploader, UploadRequest};
use crate::services::row_transformer::TransformOptions;
use crate::services::upload_client::{HttpUploadBackend, UploadBackend};
use crate::services::upload_history::{file_digest, UploadHistory, UploadHistoryEntry};
use crate::types::{UploadMode, UploadReport};

/// Result of one `upload` run
#[derive(Debug)]
pub struct UploadRun {
    pub report: UploadReport,
    /// Earlier completed upload with identical bytes, if any
    pub previous: Option<UploadHistoryEntry>,
}

pub async fn handle_upload(
    config: &Config,
    history: &UploadHistory,
    file: &Path,
    mode: UploadMode,
    options: TransformOptions,
) -> Result<()> {
    let api_url = config.require_api_url()?;

    let token = match &config.api_token {
        Some(token) => token.clone(),
        None => prompt_token()?,
    };
    let credentials = Arc::new(StaticTokenProvider::new(Some(token)));
    if !credentials.has_token() {
        eprintln!("{}", UploadError::MissingCredentials.user_message());
        anyhow::bail!("No API token given; set TALENT_API_TOKEN or enter one at the prompt");
    }

    let backend = HttpUploadBackend::new(api_url, config.upload_timeout, credentials)
        .context("Failed to create HTTP client")?;

    let run = run_upload(Arc::new(backend), history, file, mode, options).await?;
    if let Some(previous) = &run.previous {
        eprintln!(
            "Note: this file was already uploaded as '{}' on {}.",
            previous.file_name,
            previous.completed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    print!("{}", report::render_upload_report(&run.report));
    Ok(())
}

/// Read `file`, submit it through `backend` and record the attempt in `history`
pub async fn run_upload(
    backend: Arc<dyn UploadBackend>,
    history: &UploadHistory,
    file: &Path,
    mode: UploadMode,
    options: TransformOptions,
) -> Result<UploadRun> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());

    let bytes = match tokio::fs::read(file).await {
        Ok(bytes) => bytes,
        Err(e) => return Err(upload_failed(UploadError::Io(e), &file_name)),
    };

    let digest = file_digest(&bytes);
    let previous = history.find_previous(&digest);
    if let Some(previous) = &previous {
        warn!(
            "'{}' has the same content as '{}' uploaded at {}; uploading again may create duplicate profiles",
            file_name, previous.file_name, previous.completed_at
        );
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let uploader = BulkUploader::new(backend).with_status_channel(tx);

    let progress = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            eprintln!("{}", report::describe_status(&update.status));
        }
    });

    let started_at = Utc::now();
    let request = UploadRequest {
        file_name: file_name.clone(),
        bytes,
        mode,
        options,
    };
    let result = uploader.submit(request).await;

    // Closes the status channel so the progress task ends
    drop(uploader);
    let _ = progress.await;

    match result {
        Ok(upload_report) => {
            history.record_completed(&digest, started_at, &upload_report);
            Ok(UploadRun { report: upload_report, previous })
        }
        Err(e) => {
            history.record_failed(&file_name, &digest, mode, started_at, e.to_string());
            Err(upload_failed(e, &file_name))
        }
    }
}

fn upload_failed(e: UploadError, file_name: &str) -> anyhow::Error {
    if let UploadError::Validation(errors) = &e {
        eprint!("{}", report::render_validation_errors(errors));
    }
    if e.is_transport() {
        warn!("No outcome received for '{}'; it is not retried automatically", file_name);
    }
    eprintln!("{}", e.user_message());
    anyhow::Error::new(e).context(format!("Upload of '{}' failed", file_name))
}

pub fn handle_history(history: &UploadHistory, limit: usize) -> Result<()> {
    if history.is_empty() {
        info!("Upload history is empty");
    } else {
        info!("Showing up to {} of {} recorded uploads", limit, history.len());
    }
    print!("{}", report::render_history(&history.recent(limit)));
    Ok(())
}

fn prompt_token() -> Result<String> {
    rpassword::prompt_password("Talent API token: ").context("Failed to read API token")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::upload_client::mock::MockUploadBackend;
    use crate::types::BulkUploadOutcome;

    const NURSES_CSV: &str = "Title,First Name,Last Name,Email\nMs.,Ana,Lee,ana@x.com\nMr.,Ben,Kim,ben@x.com\n";

    fn created(n: u32) -> BulkUploadOutcome {
        BulkUploadOutcome {
            created_profiles_count: n,
            ..Default::default()
        }
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_repeated_upload_is_flagged_and_both_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let first_path = write_csv(&dir, "nurses.csv", NURSES_CSV);
        let second_path = write_csv(&dir, "nurses-copy.csv", NURSES_CSV);
        let history = UploadHistory::in_memory();
        let backend = Arc::new(MockUploadBackend::returning(created(2)));

        let first = run_upload(backend.clone(), &history, &first_path, UploadMode::Server, TransformOptions::default())
            .await
            .unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.report.outcome.created_profiles_count, 2);

        let second = run_upload(backend.clone(), &history, &second_path, UploadMode::Server, TransformOptions::default())
            .await
            .unwrap();
        let previous = second.previous.unwrap();
        assert_eq!(previous.id, first.report.upload_id);
        assert_eq!(previous.file_name, "nurses.csv");

        assert_eq!(backend.call_count(), 2);
        let recent = history.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].file_name, "nurses-copy.csv");
        assert_eq!(recent[0].status, "completed");
        assert_eq!(recent[0].digest, recent[1].digest);
    }

    #[tokio::test]
    async fn test_failed_upload_is_recorded_but_not_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "nurses.csv", NURSES_CSV);
        let history = UploadHistory::in_memory();

        let failing = Arc::new(MockUploadBackend::with(|| {
            Err(UploadError::Status { status: 502, body: "bad gateway".to_string() })
        }));
        let err = run_upload(failing, &history, &path, UploadMode::Server, TransformOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<UploadError>(), Some(UploadError::Status { status: 502, .. })));
        assert!(err.to_string().contains("nurses.csv"));

        let recent = history.recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].status, "failed");
        assert!(recent[0].error.as_deref().unwrap().contains("502"));

        let retry = run_upload(
            Arc::new(MockUploadBackend::returning(created(2))),
            &history,
            &path,
            UploadMode::Server,
            TransformOptions::default(),
        )
        .await
        .unwrap();
        assert!(retry.previous.is_none());
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_local_validation_failure_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "nurses.csv", "First Name,Last Name,Email\n,Lee,ana@x.com\n");
        let history = UploadHistory::in_memory();
        let backend = Arc::new(MockUploadBackend::returning(created(1)));

        let err = run_upload(backend.clone(), &history, &path, UploadMode::Local, TransformOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<UploadError>(), Some(UploadError::Validation(errors)) if errors.len() == 1));
        assert_eq!(backend.call_count(), 0);
        assert_eq!(history.recent(1)[0].status, "failed");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let history = UploadHistory::in_memory();
        let backend = Arc::new(MockUploadBackend::returning(created(1)));

        let err = run_upload(
            backend.clone(),
            &history,
            &dir.path().join("missing.csv"),
            UploadMode::Server,
            TransformOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<UploadError>(), Some(UploadError::Io(_))));
        assert_eq!(backend.call_count(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_on_empty_store() {
        let history = UploadHistory::in_memory();
        assert!(handle_history(&history, 5).is_ok());
    }
}
