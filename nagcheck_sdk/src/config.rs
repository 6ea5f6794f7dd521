//! # Probe Configuration
//!
//! Settings shared by all probes. Values come from an optional TOML file and
//! are then overridden per field from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "NAGCHECK_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Directory holding snapshot files for change checks
    pub state_dir: PathBuf,

    pub http_timeout_secs: u64,

    pub command_timeout_secs: u64,

    /// OSSEC installation root
    pub ossec_path: PathBuf,

    /// File declaring the OSSEC install type
    pub ossec_init_conf: PathBuf,

    /// Accept self-signed certificates from switches and backup servers
    pub accept_invalid_certs: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("/var/lib/nagcheck"),
            http_timeout_secs: 10,
            command_timeout_secs: 5,
            ossec_path: PathBuf::from("/var/ossec"),
            ossec_init_conf: PathBuf::from("/etc/ossec-init.conf"),
            accept_invalid_certs: false,
        }
    }
}

impl ProbeConfig {
    /// Load from `path` (or `NAGCHECK_CONFIG`) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let path = path.map(Path::to_path_buf).or(from_env);

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply per-field overrides; unparsable values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("NAGCHECK_STATE_DIR") {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("NAGCHECK_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http_timeout_secs = secs;
        }
        if let Some(secs) = lookup("NAGCHECK_COMMAND_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.command_timeout_secs = secs;
        }
        if let Some(path) = lookup("NAGCHECK_OSSEC_PATH") {
            self.ossec_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("NAGCHECK_OSSEC_INIT_CONF") {
            self.ossec_init_conf = PathBuf::from(path);
        }
        if let Some(accept) = lookup("NAGCHECK_ACCEPT_INVALID_CERTS").and_then(|v| v.parse().ok())
        {
            self.accept_invalid_certs = accept;
        }
        self
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn with_ossec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ossec_path = path.into();
        self
    }

    pub fn with_ossec_init_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.ossec_init_conf = path.into();
        self
    }

    pub fn with_http_timeout(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/nagcheck"));
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.command_timeout(), Duration::from_secs(5));
        assert_eq!(config.ossec_path, PathBuf::from("/var/ossec"));
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nagcheck.toml");
        fs::write(&path, "state_dir = \"/tmp/nagcheck\"\nhttp_timeout_secs = 3\n").unwrap();

        let config = ProbeConfig::from_file(&path).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/nagcheck"));
        assert_eq!(config.http_timeout_secs, 3);
        assert_eq!(config.command_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "http_timeout_secs = \"soon\"").unwrap();

        assert_matches!(
            ProbeConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        );
        assert_matches!(
            ProbeConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        );
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NAGCHECK_STATE_DIR", "/run/nagcheck"),
            ("NAGCHECK_HTTP_TIMEOUT_SECS", "30"),
            ("NAGCHECK_COMMAND_TIMEOUT_SECS", "not-a-number"),
            ("NAGCHECK_ACCEPT_INVALID_CERTS", "true"),
            ("NAGCHECK_OSSEC_PATH", "/opt/ossec"),
            ("NAGCHECK_OSSEC_INIT_CONF", "/opt/ossec/etc/ossec-init.conf"),
        ]
        .into_iter()
        .collect();

        let config =
            ProbeConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.state_dir, PathBuf::from("/run/nagcheck"));
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.command_timeout_secs, 5);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.ossec_path, PathBuf::from("/opt/ossec"));
        assert_eq!(
            config.ossec_init_conf,
            PathBuf::from("/opt/ossec/etc/ossec-init.conf")
        );
    }
}
