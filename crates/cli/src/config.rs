// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration.
//!
//! Configuration is read from a TOML file found at `--config`,
//! `$OUTBOX_CONFIG`, or `<config dir>/outbox/config.toml`, and includes:
//! - `[remote]`: chat API base URL, bearer token and request timeout
//! - `[sync]`: retry budget, drain interval and storage key
//! - `[storage]`: directory holding the persisted queue
//! - `[probe]`: reachability probe target and timing
//! - `[log]`: optional log file
//!
//! Every field has a default, so a missing default file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{HttpSenderConfig, ProbeConfig, SyncConfig};

const APP_DIR_NAME: &str = "outbox";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub probe: ProbeSettings,
    #[serde(default)]
    pub log: LogConfig,
}

/// Chat API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the chat API (default: `http://127.0.0.1:8080`).
    #[serde(default = "default_remote_url")]
    pub url: String,
    /// Bearer token. `$OUTBOX_TOKEN` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Timeout of a single send in seconds (default: 10).
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: default_remote_url(),
            token: None,
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Failed attempts before a message is marked failed (default: 3).
    #[serde(default = "default_max_retry_count")]
    pub max_retry_count: u32,
    /// Background drain period in seconds (default: 30).
    #[serde(default = "default_sync_interval_secs")]
    pub interval_secs: u64,
    /// Key the queue is stored under (default: `offline_data`).
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            max_retry_count: default_max_retry_count(),
            interval_secs: default_sync_interval_secs(),
            storage_key: default_storage_key(),
        }
    }
}

/// Where the queue lives on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Defaults to `<data dir>/outbox`; `$OUTBOX_DATA_DIR`
    /// takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Reachability probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// `host:port` to probe. Derived from the remote URL when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Seconds between probes (default: 5).
    #[serde(default = "default_probe_interval_secs")]
    pub interval_secs: u64,
    /// Connect timeout in milliseconds (default: 1000).
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        ProbeSettings {
            address: None,
            interval_secs: default_probe_interval_secs(),
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append logs to this file instead of stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retry_count() -> u32 {
    crate::sync::DEFAULT_MAX_RETRY_COUNT
}

fn default_sync_interval_secs() -> u64 {
    crate::sync::DEFAULT_SYNC_INTERVAL.as_secs()
}

fn default_storage_key() -> String {
    crate::sync::DEFAULT_STORAGE_KEY.to_string()
}

fn default_probe_interval_secs() -> u64 {
    5
}

fn default_probe_timeout_ms() -> u64 {
    1000
}

impl Config {
    /// Returns `<config dir>/outbox/config.toml`, if the platform has a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Finds, loads and validates the configuration, applying environment
    /// overrides.
    ///
    /// An explicit path (flag or `$OUTBOX_CONFIG`) must exist; the default
    /// path may be missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result
    /// fails [`Config::validate`].
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit.map(Path::to_path_buf).or_else(env::config_path);
        let mut config = match explicit {
            Some(path) => Self::load(&path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(env::token(), env::data_dir());
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist, or
    /// [`Error::Config`] if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Applies values that take precedence over the file.
    pub fn apply_overrides(&mut self, token: Option<String>, data_dir: Option<PathBuf>) {
        if token.is_some() {
            self.remote.token = token;
        }
        if data_dir.is_some() {
            self.storage.dir = data_dir;
        }
    }

    /// Checks values the sync stack cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = &self.remote.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidRemoteUrl(url.clone()));
        }
        Url::parse(url).map_err(|_| Error::InvalidRemoteUrl(url.clone()))?;

        let positive = [
            ("remote.timeout_secs", self.remote.timeout_secs),
            ("sync.max_retry_count", u64::from(self.sync.max_retry_count)),
            ("sync.interval_secs", self.sync.interval_secs),
            ("probe.interval_secs", self.probe.interval_secs),
            ("probe.timeout_ms", self.probe.timeout_ms),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::MustBePositive { field: *field });
        }
        if self.sync.storage_key.is_empty() {
            return Err(Error::Config("sync.storage_key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Directory holding the persisted queue.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(Error::NoDataDir)
    }

    /// Address the reachability probe connects to: `[probe] address`, or the
    /// host and port of the remote URL.
    pub fn probe_address(&self) -> Result<String> {
        if let Some(address) = &self.probe.address {
            return Ok(address.clone());
        }
        let url = Url::parse(&self.remote.url)
            .map_err(|_| Error::InvalidRemoteUrl(self.remote.url.clone()))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidRemoteUrl(self.remote.url.clone()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::InvalidRemoteUrl(self.remote.url.clone()))?;
        Ok(format!("{}:{}", host, port))
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_retry_count: self.sync.max_retry_count,
            sync_interval: Duration::from_secs(self.sync.interval_secs),
            storage_key: self.sync.storage_key.clone(),
        }
    }

    pub fn sender_config(&self) -> HttpSenderConfig {
        HttpSenderConfig {
            base_url: self.remote.url.clone(),
            token: self.remote.token.clone(),
            timeout: Duration::from_secs(self.remote.timeout_secs),
        }
    }

    pub fn probe_config(&self) -> Result<ProbeConfig> {
        Ok(ProbeConfig {
            address: self.probe_address()?,
            interval: Duration::from_secs(self.probe.interval_secs),
            timeout: Duration::from_millis(self.probe.timeout_ms),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
