//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{self, Context, Result};

use crate::services::upload_history::HISTORY_FILE_NAME;
use crate::types::{ListTokenPolicy, RequiredPolicy, UploadMode};

const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LOGS_DIR: &str = "./logs";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Talent backend base URL; needed only by `upload`
    pub api_url: Option<String>,

    /// Bearer token; prompted for when absent
    pub api_token: Option<String>,

    pub upload_mode: UploadMode,
    pub required_policy: RequiredPolicy,
    pub list_policy: ListTokenPolicy,

    /// Whole-request timeout for the backend call
    pub upload_timeout: Duration,

    /// Directory for rolling logs and the upload history file
    pub logs_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get("TALENT_API_URL");
        if let Some(url) = &api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("TALENT_API_URL must start with http:// or https:// (got '{}')", url);
            }
        }

        let upload_mode: UploadMode = match get("UPLOAD_MODE") {
            Some(v) => v.parse().map_err(anyhow::Error::msg).context("Invalid UPLOAD_MODE")?,
            None => UploadMode::default(),
        };

        let required_policy: RequiredPolicy = match get("REQUIRED_POLICY") {
            Some(v) => v.parse().map_err(anyhow::Error::msg).context("Invalid REQUIRED_POLICY")?,
            None => RequiredPolicy::default(),
        };

        let list_policy: ListTokenPolicy = match get("LIST_TOKEN_POLICY") {
            Some(v) => v.parse().map_err(anyhow::Error::msg).context("Invalid LIST_TOKEN_POLICY")?,
            None => ListTokenPolicy::default(),
        };

        let timeout_secs = match get("UPLOAD_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("UPLOAD_TIMEOUT_SECS must be a whole number of seconds (got '{}')", v))?,
            None => DEFAULT_UPLOAD_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("UPLOAD_TIMEOUT_SECS must be greater than zero");
        }

        let logs_dir = get("LOGS_DIR").unwrap_or_else(|| DEFAULT_LOGS_DIR.to_string());

        Ok(Self {
            api_url,
            api_token: get("TALENT_API_TOKEN"),
            upload_mode,
            required_policy,
            list_policy,
            upload_timeout: Duration::from_secs(timeout_secs),
            logs_dir: PathBuf::from(logs_dir),
        })
    }

    /// Backend URL, or an error explaining how to set it
    pub fn require_api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .context("TALENT_API_URL must be set to upload profiles")
    }

    pub fn history_path(&self) -> PathBuf {
        self.logs_dir.join(HISTORY_FILE_NAME)
    }
}
