//! Issue tracker client (GitHub REST API)

use crate::clients::http::{read_json, ApiError};
use crate::core::config::{Config, ConfigError, GitHubSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

const SERVICE: &str = "GitHub";

/// Issue to open
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
}

/// The parts of a created issue the workflow uses
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, ApiError>;
}

/// GitHub client bound to one repository
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    user: String,
    token: String,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings, user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            user: user.into(),
            token: token.into(),
        }
    }

    /// Build the client, failing if its credentials are not configured
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config.settings.github,
            config.credentials.github_user()?,
            config.credentials.github_token()?,
        ))
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/{}/issues", self.api_url, self.owner, self.repo)
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, ApiError> {
        info!("Creating issue in {}/{}: {}", self.owner, self.repo, issue.title);

        let response = self
            .http
            .post(self.issues_url())
            .header("Authorization", format!("token {}", self.token))
            .header("User-Agent", self.user.as_str())
            .header("Accept", "application/vnd.github+json")
            .json(issue)
            .send()
            .await
            .map_err(ApiError::transport(SERVICE))?;

        read_json(SERVICE, response).await
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("repo", &format!("{}/{}", self.owner, self.repo))
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
