use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use backend_domain::RemoteFileStore;

const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GithubRepoConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub token: String,
}

/// File storage on top of the GitHub contents API.
pub struct GithubContentsStore {
    client: Client,
    api_base: String,
    config: GithubRepoConfig,
}

#[derive(Deserialize)]
struct ContentMeta {
    sha: String,
}

#[derive(Serialize)]
struct PutContent<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GithubContentsStore {
    pub fn new(config: GithubRepoConfig, timeout_seconds: u64) -> anyhow::Result<Self> {
        Self::with_api_base(config, timeout_seconds, GITHUB_API)
    }

    pub fn with_api_base(
        config: GithubRepoConfig,
        timeout_seconds: u64,
        api_base: &str,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("btag-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.config.owner,
            self.config.repo,
            path.trim_start_matches('/')
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn current_sha(&self, path: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .authorized(self.client.get(self.contents_url(path)))
            .query(&[("ref", self.config.branch.as_str())])
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .with_context(|| format!("fetch metadata for {}", path))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let meta: ContentMeta = response
            .error_for_status()
            .with_context(|| format!("fetch metadata for {}", path))?
            .json()
            .await
            .with_context(|| format!("parse metadata for {}", path))?;
        Ok(Some(meta.sha))
    }
}

#[async_trait]
impl RemoteFileStore for GithubContentsStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let response = self
            .authorized(self.client.get(self.contents_url(path)))
            .query(&[("ref", self.config.branch.as_str())])
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await
            .with_context(|| format!("download {}", path))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = response
            .error_for_status()
            .with_context(|| format!("download {}", path))?
            .bytes()
            .await?;
        Ok(Some(bytes.to_vec()))
    }

    async fn put(&self, path: &str, content: &[u8], message: &str) -> anyhow::Result<()> {
        let sha = self.current_sha(path).await?;
        let body = PutContent {
            message,
            content: B64.encode(content),
            branch: &self.config.branch,
            sha,
        };
        let response = self
            .authorized(self.client.put(self.contents_url(path)))
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("upload {}", path))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("upload {} failed with {}: {}", path, status, detail));
        }
        info!("uploaded {} to {}", path, self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "github:{}/{}@{}",
            self.config.owner, self.config.repo, self.config.branch
        )
    }
}
