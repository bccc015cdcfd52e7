// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Collector settings and runtime options.
//!
//! The collector settings live in `config_pour.json` under the log path. A
//! missing file is created from a placeholder template; the caller is then
//! expected to stop so an operator can fill it in.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::persister::PersistFailurePolicy;

pub const CONFIG_FILE_NAME: &str = "config_pour.json";
pub const DOCKER_LOG_PATH: &str = "./data";
pub const DEFAULT_LOG_PATH: &str = ".";
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

const DEFAULT_FILE_CONTENT: &str = r#"{
	"remote_logs": true,
	"project_key": "<GET THIS FROM SERVER ADMINISTRATOR>",
	"host": "127.0.0.1",
	"port": 12555,
	"client": "loguser2",
	"client_key": "b930ffce-d388-43fc-aa1a-13962a7d6bc9"
}"#;

/// Connection settings for the remote collector. Loaded once, never reloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub remote_logs: bool,
    #[serde(default)]
    pub project_key: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: i64,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub client_key: String,
}

impl RemoteConfig {
    /// Presence checks for the fields the shipper needs.
    #[must_use]
    pub fn is_valid_for_remote(&self) -> bool {
        !self.host.is_empty()
            && self.port > 0
            && self.port <= i64::from(u16::MAX)
            && !self.project_key.is_empty()
            && !self.client.is_empty()
            && !self.client_key.is_empty()
    }

    /// Whether the flush loop should ship at all.
    #[must_use]
    pub fn remote_enabled(&self) -> bool {
        self.remote_logs && self.is_valid_for_remote()
    }
}

/// Process-level options chosen by the host.
#[derive(Debug, Clone)]
pub struct PourOptions {
    /// Store logs and config under `./data` instead of `log_path`.
    pub is_docker: bool,
    pub log_path: PathBuf,
    /// Use `https` for the collector. Can be changed later with
    /// [`crate::RemoteShipper::set_use_tls`].
    pub use_tls: bool,
    pub accept_invalid_certs: bool,
    pub flush_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub persist_failure_policy: PersistFailurePolicy,
    /// Cap on the remote buffer. `None` keeps it unbounded.
    pub max_buffered_events: Option<usize>,
}

impl Default for PourOptions {
    fn default() -> Self {
        PourOptions {
            is_docker: false,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            use_tls: true,
            accept_invalid_certs: false,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            request_timeout: None,
            persist_failure_policy: PersistFailurePolicy::Abort,
            max_buffered_events: None,
        }
    }
}

impl PourOptions {
    #[must_use]
    pub fn resolved_log_path(&self) -> PathBuf {
        if self.is_docker {
            PathBuf::from(DOCKER_LOG_PATH)
        } else {
            self.log_path.clone()
        }
    }
}

#[must_use]
pub fn config_file(log_path: &Path) -> PathBuf {
    log_path.join(CONFIG_FILE_NAME)
}

/// Reads `config_pour.json`, creating it from the template when absent.
///
/// Creating the file always yields [`ConfigError::Bootstrapped`].
pub fn load_or_bootstrap(log_path: &Path) -> Result<RemoteConfig, ConfigError> {
    let path = config_file(log_path);
    if !path.exists() {
        fs::write(&path, DEFAULT_FILE_CONTENT).map_err(ConfigError::Create)?;
        return Err(ConfigError::Bootstrapped(path));
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Read)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> RemoteConfig {
        RemoteConfig {
            remote_logs: true,
            project_key: "pk".to_string(),
            host: "collector.local".to_string(),
            port: 12555,
            client: "client".to_string(),
            client_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_bootstrapped() {
        let dir = TempDir::new().unwrap();

        let result = load_or_bootstrap(dir.path());

        assert!(matches!(result, Err(ConfigError::Bootstrapped(_))));
        let written = fs::read_to_string(config_file(dir.path())).unwrap();
        let parsed: RemoteConfig = serde_json::from_str(&written).unwrap();
        assert!(parsed.remote_logs);
        assert_eq!(parsed.host, "127.0.0.1");
        assert_eq!(parsed.port, 12555);
        assert_eq!(parsed.client, "loguser2");
    }

    #[test]
    fn test_existing_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            config_file(dir.path()),
            serde_json::to_string(&valid_config()).unwrap(),
        )
        .unwrap();

        let config = load_or_bootstrap(dir.path()).unwrap();

        assert_eq!(config, valid_config());
    }

    #[test]
    fn test_garbage_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(config_file(dir.path()), "not json").unwrap();

        assert!(matches!(
            load_or_bootstrap(dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let config: RemoteConfig = serde_json::from_str(r#"{"remote_logs": true}"#).unwrap();
        assert!(!config.is_valid_for_remote());
        assert!(!config.remote_enabled());
    }

    #[test]
    fn test_validity_checks() {
        assert!(valid_config().is_valid_for_remote());

        let mut config = valid_config();
        config.port = 0;
        assert!(!config.is_valid_for_remote());

        let mut config = valid_config();
        config.client_key = String::new();
        assert!(!config.is_valid_for_remote());

        let mut config = valid_config();
        config.remote_logs = false;
        assert!(config.is_valid_for_remote());
        assert!(!config.remote_enabled());
    }

    #[test]
    fn test_docker_log_path() {
        let options = PourOptions {
            is_docker: true,
            ..Default::default()
        };
        assert_eq!(options.resolved_log_path(), PathBuf::from("./data"));
        assert_eq!(
            PourOptions::default().resolved_log_path(),
            PathBuf::from(".")
        );
    }

    #[test]
    fn test_default_options() {
        let options = PourOptions::default();
        assert!(options.use_tls);
        assert!(!options.accept_invalid_certs);
        assert_eq!(options.flush_interval, Duration::from_secs(5));
        assert_eq!(options.max_buffered_events, None);
    }
}
