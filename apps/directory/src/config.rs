use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use chrono::Duration as ChronoDuration;
use client_core::{source::DEFAULT_USERS_ENDPOINT, StoreOptions, DEFAULT_SNAPSHOT_KEY};
use storage::sqlite_url;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "directory.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint_url: String,
    pub database_url: String,
    pub snapshot_key: String,
    pub request_timeout_secs: u64,
    pub snapshot_max_age_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_USERS_ENDPOINT.into(),
            database_url: "sqlite://./data/directory.db".into(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.into(),
            request_timeout_secs: 10,
            snapshot_max_age_secs: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            snapshot_key: self.snapshot_key.clone(),
            snapshot_max_age: self
                .snapshot_max_age_secs
                .and_then(|secs| i64::try_from(secs).ok())
                .map(ChronoDuration::seconds),
        }
    }

    /// The configured database as a sqlx URL; a blank setting falls back to the default file.
    pub fn resolved_database_url(&self) -> String {
        if self.database_url.trim().is_empty() {
            sqlite_url(&Settings::default().database_url)
        } else {
            sqlite_url(&self.database_url)
        }
    }

    pub fn checked_endpoint(&self) -> anyhow::Result<Url> {
        Url::parse(self.endpoint_url.trim())
            .with_context(|| format!("invalid endpoint url '{}'", self.endpoint_url))
    }
}

/// Defaults, then the optional toml file, then environment variables.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable config file");
            return;
        }
    };

    if let Some(v) = file_cfg.get("endpoint_url") {
        settings.endpoint_url = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("snapshot_key") {
        settings.snapshot_key = v.clone();
    }
    if let Some(parsed) = file_cfg
        .get("request_timeout_secs")
        .and_then(|v| v.parse::<u64>().ok())
    {
        settings.request_timeout_secs = parsed;
    }
    if let Some(parsed) = file_cfg
        .get("snapshot_max_age_secs")
        .and_then(|v| v.parse::<u64>().ok())
    {
        settings.snapshot_max_age_secs = Some(parsed);
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DIRECTORY_ENDPOINT") {
        settings.endpoint_url = v;
    }
    if let Some(v) = var("APP__ENDPOINT_URL") {
        settings.endpoint_url = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__SNAPSHOT_KEY") {
        settings.snapshot_key = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = var("APP__SNAPSHOT_MAX_AGE_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.snapshot_max_age_secs = Some(parsed);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
