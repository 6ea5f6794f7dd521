//! API credentials loaded from a JSON or TOML file
//!
//! `.toml` files are parsed as TOML and `.json` files as JSON. Any other
//! extension tries JSON first and then TOML, which also accepts the
//! `user = "..."` assignment style.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Could not open credential file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential file '{}' is not valid JSON or TOML: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Credential field '{field}' is empty")]
    EmptyField { field: &'static str },
}

impl CredentialError {
    pub fn user_message(&self) -> String {
        match self {
            CredentialError::Read { path, .. } => format!(
                "Could not open credential file {}! Does it exist?",
                path.display()
            ),
            CredentialError::Parse { path, .. } => format!(
                "Credential file {} must contain \"user\" and \"password\" as JSON or TOML",
                path.display()
            ),
            CredentialError::EmptyField { field } => {
                format!("Credential field '{}' is empty", field)
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = fs::read_to_string(path).map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let parsed = match extension.as_deref() {
            Some("json") => Self::from_json(&contents),
            Some("toml") => Self::from_toml(&contents),
            _ => Self::from_json(&contents).or_else(|_| Self::from_toml(&contents)),
        };

        let credentials = parsed.map_err(|reason| CredentialError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        credentials.validate()?;

        log::debug!("Loaded credentials for user '{}'", credentials.user);
        Ok(credentials)
    }

    fn from_json(contents: &str) -> Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }

    fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    fn validate(&self) -> Result<(), CredentialError> {
        if self.user.trim().is_empty() {
            return Err(CredentialError::EmptyField { field: "user" });
        }
        if self.password.is_empty() {
            return Err(CredentialError::EmptyField { field: "password" });
        }
        Ok(())
    }
}
