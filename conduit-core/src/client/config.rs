use super::auth::Credentials;
use crate::http::ResponseFormat;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Default per-request connect/read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("No host found or provided.")]
    NoHost,
    #[error("Invalid host URL '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Host URL '{0}' cannot be used as an API base (expected http or https)")]
    UnsupportedHost(String),
    #[error("No token or user/certificate pair configured for host '{0}'")]
    MissingCredentials(String),
    #[error("Failed to read config file '{}': {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config file '{}': {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a [`ConduitClient`](super::ConduitClient) needs to reach a server.
#[derive(Debug, Clone)]
pub struct ConduitConfig {
    /// API base URL, always ending in `/` (e.g. `https://phab.example.com/api/`).
    pub host: Url,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub response_format: ResponseFormat,
}

impl ConduitConfig {
    /// Creates a configuration for `host` with the default timeout and JSON responses.
    ///
    /// The URL path is normalized to end in `/` so method names are appended as a final
    /// path segment.
    pub fn new(host: &str, credentials: Credentials) -> Result<Self, ConfigurationError> {
        let mut url = Url::parse(host.trim()).map_err(|source| ConfigurationError::InvalidHost {
            host: host.to_string(),
            source,
        })?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigurationError::UnsupportedHost(host.to_string()));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            host: url,
            credentials,
            timeout: DEFAULT_TIMEOUT,
            response_format: ResponseFormat::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    /// Builds the URL of a remote method: `<host path>/<method>.<endpoint>`.
    pub fn method_url(&self, method: &str, endpoint: &str) -> Url {
        let mut url = self.host.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{method}.{endpoint}"));
        }
        url
    }
}
