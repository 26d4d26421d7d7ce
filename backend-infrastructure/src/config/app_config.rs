use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{ActivityPolicy, RuntimeConfig};

use crate::config::validation::{validate_bind_addr, validate_schedule};
use crate::services::GithubRepoConfig;

pub const CONFIG_ENV: &str = "BTAG_CONFIG";
pub const BACKOFFICE_TOKEN_ENV: &str = "BTAG_BACKOFFICE_TOKEN";
pub const GITHUB_TOKEN_ENV: &str = "BTAG_GITHUB_TOKEN";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub daily_data_path: String,
    pub members_path: String,
    pub report_dir: String,
    pub log_dir: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub backoffice_api_base: String,
    pub lookup_timeout_seconds: u64,
    pub kpi_enabled: bool,
    pub retention_days: Option<u32>,
    pub cleanup_hour: u32,
    pub cleanup_minute: u32,
    pub activity: ActivityPolicy,
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
    pub github_branch: String,
    pub remote_daily_path: String,
    pub remote_members_path: String,
    pub remote_timeout_seconds: u64,
    pub auto_sync: bool,
    #[serde(skip)]
    pub backoffice_token: Option<String>,
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            daily_data_path: runtime.daily_data_path,
            members_path: runtime.members_path,
            report_dir: runtime.report_dir,
            log_dir: None,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            backoffice_api_base: runtime.backoffice_api_base,
            lookup_timeout_seconds: runtime.lookup_timeout_seconds,
            kpi_enabled: runtime.kpi_enabled,
            retention_days: runtime.retention_days,
            cleanup_hour: runtime.cleanup_hour,
            cleanup_minute: runtime.cleanup_minute,
            activity: runtime.activity,
            github_owner: None,
            github_repo: None,
            github_branch: "main".to_string(),
            remote_daily_path: runtime.remote_daily_path,
            remote_members_path: runtime.remote_members_path,
            remote_timeout_seconds: 15,
            auto_sync: runtime.auto_sync,
            backoffice_token: None,
            github_token: None,
        }
    }
}

impl AppConfig {
    /// Loads from `BTAG_CONFIG` (default `./config.toml`).
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("read {}", file_path.display()))?;
            Self::from_toml(&content)?
        } else {
            warn!("{} not found, using defaults", file_path.display());
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse config")
    }

    pub fn normalize(&mut self) {
        self.backoffice_api_base = self.backoffice_api_base.trim().trim_end_matches('/').to_string();
        self.github_branch = self.github_branch.trim().to_string();
        if self.github_branch.is_empty() {
            self.github_branch = "main".to_string();
        }
        self.log_dir = non_blank(self.log_dir.take());
        self.github_owner = non_blank(self.github_owner.take());
        self.github_repo = non_blank(self.github_repo.take());
        self.backoffice_token = non_blank(self.backoffice_token.take());
        self.github_token = non_blank(self.github_token.take());
        if self.retention_days == Some(0) {
            self.retention_days = None;
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.daily_data_path = resolve_path(base, &self.daily_data_path);
        self.members_path = resolve_path(base, &self.members_path);
        self.report_dir = resolve_path(base, &self.report_dir);
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bind_addr(&self.bind_addr)?;
        validate_schedule(self.cleanup_hour, self.cleanup_minute)?;
        if self.daily_data_path.trim().is_empty() || self.members_path.trim().is_empty() {
            return Err(anyhow!("daily_data_path and members_path must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if !self.activity.is_ordered() {
            return Err(anyhow!(
                "activity thresholds must satisfy recent_days <= lapsing_days <= dormant_days"
            ));
        }
        if !self.backoffice_api_base.starts_with("http://")
            && !self.backoffice_api_base.starts_with("https://")
        {
            return Err(anyhow!("backoffice_api_base must be an http(s) url"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            daily_data_path: self.daily_data_path.clone(),
            members_path: self.members_path.clone(),
            report_dir: self.report_dir.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            lookup_timeout_seconds: self.lookup_timeout_seconds,
            backoffice_api_base: self.backoffice_api_base.clone(),
            kpi_enabled: self.kpi_enabled,
            retention_days: self.retention_days,
            cleanup_hour: self.cleanup_hour,
            cleanup_minute: self.cleanup_minute,
            activity: self.activity,
            auto_sync: self.auto_sync,
            remote_daily_path: self.remote_daily_path.clone(),
            remote_members_path: self.remote_members_path.clone(),
        }
    }

    /// Present only when owner, repo and token are all configured.
    pub fn github_repo_config(&self) -> Option<GithubRepoConfig> {
        Some(GithubRepoConfig {
            owner: self.github_owner.clone()?,
            repo: self.github_repo.clone()?,
            branch: self.github_branch.clone(),
            token: self.github_token.clone()?,
        })
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("BTAG_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = var("BTAG_DAILY_DATA_PATH") {
            self.daily_data_path = value;
        }
        if let Some(value) = var("BTAG_MEMBERS_PATH") {
            self.members_path = value;
        }
        if let Some(value) = var("BTAG_REPORT_DIR") {
            self.report_dir = value;
        }
        if let Some(value) = var("BTAG_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Some(value) = var("BTAG_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = var("BTAG_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = var("BTAG_BACKOFFICE_API_BASE") {
            self.backoffice_api_base = value;
        }
        if let Some(value) = var("BTAG_LOOKUP_TIMEOUT_SECONDS") {
            self.lookup_timeout_seconds = value.parse().unwrap_or(self.lookup_timeout_seconds);
        }
        if let Some(value) = var("BTAG_KPI_ENABLED") {
            self.kpi_enabled = value.parse().unwrap_or(self.kpi_enabled);
        }
        if let Some(value) = var("BTAG_RETENTION_DAYS") {
            self.retention_days = value.parse().ok();
        }
        if let Some(value) = var("BTAG_CLEANUP_HOUR") {
            self.cleanup_hour = value.parse().unwrap_or(self.cleanup_hour);
        }
        if let Some(value) = var("BTAG_CLEANUP_MINUTE") {
            self.cleanup_minute = value.parse().unwrap_or(self.cleanup_minute);
        }
        if let Some(value) = var("BTAG_GITHUB_OWNER") {
            self.github_owner = Some(value);
        }
        if let Some(value) = var("BTAG_GITHUB_REPO") {
            self.github_repo = Some(value);
        }
        if let Some(value) = var("BTAG_GITHUB_BRANCH") {
            self.github_branch = value;
        }
        if let Some(value) = var("BTAG_AUTO_SYNC") {
            self.auto_sync = value.parse().unwrap_or(self.auto_sync);
        }
        if let Some(value) = var(BACKOFFICE_TOKEN_ENV) {
            self.backoffice_token = Some(value);
        }
        if let Some(value) = var(GITHUB_TOKEN_ENV) {
            self.github_token = Some(value);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
