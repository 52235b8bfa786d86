use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::{future::Future, time::Duration};
use url::Url;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: '{0}'")]
    ClientBuild(#[source] reqwest::Error),
    #[error("Request to '{url}' failed: '{source}'")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Bad response status: {0}")]
    BadStatus(StatusCode),
    #[error("Transport failure: '{0}'")]
    Other(#[source] BoxError),
}

/// A `POST` request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: HeaderMap,
    /// `application/x-www-form-urlencoded` body.
    pub body: String,
}

/// The raw response to an [`HttpRequest`], whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A blocking-per-call request/response transport.
///
/// Implementations return `Ok` for every response they receive, including non-2xx ones;
/// status handling belongs to the caller.
pub trait Transport {
    fn post(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// The default [`Transport`], backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose requests give up after `timeout`, covering both connecting
    /// and reading the response.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(TransportError::ClientBuild)?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.to_string();

        let response = self
            .client
            .post(request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|source| TransportError::RequestFailed {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::RequestFailed { url, source })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
