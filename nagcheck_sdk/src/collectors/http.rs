//! Blocking HTTP transport with basic auth and a request timeout

use crate::credentials::Credentials;
use nagcheck_engine::strategies::CollectionError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Configuration for the HTTP transport layer
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    /// Accept self-signed or otherwise invalid TLS certificates
    pub accept_invalid_certs: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

/// JSON-over-HTTP client authenticating every request with basic auth
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    credentials: Credentials,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings, credentials: Credentials) -> Result<Self, CollectionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| CollectionError::TransportFailed {
                endpoint: "http client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
            timeout: settings.timeout,
        })
    }

    pub fn get_json(&self, url: &str) -> Result<Value, CollectionError> {
        log::info!("GET {}", url);
        let request = self
            .client
            .get(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password));
        self.send(url, request)
    }

    pub fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<Value, CollectionError> {
        log::info!("POST {}", url);
        let request = self
            .client
            .post(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .json(body);
        self.send(url, request)
    }

    fn send(
        &self,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<Value, CollectionError> {
        let response = request.send().map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        log::debug!("{} responded with {}", url, status);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CollectionError::AccessDenied {
                endpoint: url.to_string(),
                reason: status.to_string(),
            });
        }
        if !status.is_success() {
            return Err(CollectionError::BackendError {
                endpoint: url.to_string(),
                message: status.to_string(),
            });
        }

        response
            .json::<Value>()
            .map_err(|e| CollectionError::data_format(format!("invalid JSON from {}: {}", url, e)))
    }

    fn transport_error(&self, url: &str, error: reqwest::Error) -> CollectionError {
        if error.is_timeout() {
            CollectionError::Timeout {
                endpoint: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            CollectionError::TransportFailed {
                endpoint: url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}
