//! Command handlers

pub mod report;
pub mod upload;
pub mod validate;

use anyhow::Result;
use tracing::warn;

use crate::cli::Command;
use crate::config::Config;
use crate::services::row_transformer::TransformOptions;
use crate::services::upload_history::UploadHistory;
use crate::types::{ListTokenPolicy, RequiredPolicy};

/// Run one CLI command
pub async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Upload { file, mode, legacy_required, trim_lists } => {
            let history = open_history(config);
            let options = transform_options(config, legacy_required, trim_lists);
            let mode = mode.unwrap_or(config.upload_mode);
            upload::handle_upload(config, &history, &file, mode, options).await
        }
        Command::Validate { file, strict, legacy_required, trim_lists } => {
            let options = transform_options(config, legacy_required, trim_lists);
            validate::handle_validate(&file, options, strict)
        }
        Command::Template { output } => validate::handle_template(output.as_deref()),
        Command::History { limit } => {
            let history = open_history(config);
            upload::handle_history(&history, limit)
        }
    }
}

/// History under the logs directory; kept in memory only when that directory is unusable
fn open_history(config: &Config) -> UploadHistory {
    if config.logs_dir.is_dir() {
        UploadHistory::open(config.history_path())
    } else {
        warn!(
            "Logs directory {} is not available; upload history will not be saved",
            config.logs_dir.display()
        );
        UploadHistory::in_memory()
    }
}

/// Config policies, overridden by CLI flags
fn transform_options(config: &Config, legacy_required: bool, trim_lists: bool) -> TransformOptions {
    TransformOptions {
        required: if legacy_required { RequiredPolicy::Legacy } else { config.required_policy },
        lists: if trim_lists { ListTokenPolicy::Trim } else { config.list_policy },
    }
}
