use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::domain::UserRecord;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

pub const DEFAULT_USERS_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The remote record set, consulted when no local snapshot is usable.
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError>;
}

/// Offline stand-in: every fetch fails.
pub struct MissingUserSource;

#[async_trait]
impl UserSource for MissingUserSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        Err(FetchError::Unavailable)
    }
}

pub struct HttpUserSource {
    http: Client,
    endpoint: Url,
}

impl HttpUserSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid users endpoint '{endpoint}'"))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|err| {
                warn!(endpoint = %self.endpoint, error = %err, "users request failed");
                FetchError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "users request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let users: Vec<UserRecord> =
            serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))?;
        debug!(endpoint = %self.endpoint, count = users.len(), "users fetched");
        Ok(users)
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
