//! Pass-through image relay.
//!
//! Fetches an absolute URL and hands the response back as a byte stream
//! together with the upstream status and content headers. Non-success
//! upstream statuses are relayed, not treated as errors.

use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, REFERER};
use reqwest::{Client, Response, Url};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ProxyConfig;
use crate::metrics::PROXY_FETCHES_TOTAL;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream request failed: {0}")]
    Request(String),

    #[error("Upstream stream failed: {0}")]
    Stream(String),
}

/// HTTP client for relaying images.
#[derive(Clone)]
pub struct ImageProxy {
    client: Client,
}

impl ImageProxy {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = &config.referer {
            let value =
                HeaderValue::from_str(referer).map_err(|e| ProxyError::Client(e.to_string()))?;
            headers.insert(REFERER, value);
        }

        // No whole-request deadline: it would also cut off long body
        // transfers. The timeout bounds connecting and each read instead.
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Start fetching `url`. The body is not read until the returned
    /// [`UpstreamImage`] is streamed.
    pub async fn fetch(&self, url: &str) -> Result<UpstreamImage, ProxyError> {
        let url = parse_url(url)?;
        debug!(url = %url, "Relaying image");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            PROXY_FETCHES_TOTAL.with_label_values(&["failed"]).inc();
            warn!(url = %url, error = %e, "Upstream fetch failed");
            if e.is_timeout() {
                ProxyError::Timeout
            } else {
                ProxyError::Request(e.to_string())
            }
        })?;

        let outcome = if response.status().is_success() {
            "success"
        } else {
            "upstream_error"
        };
        PROXY_FETCHES_TOTAL.with_label_values(&[outcome]).inc();

        Ok(UpstreamImage::from_response(response))
    }
}

fn parse_url(raw: &str) -> Result<Url, ProxyError> {
    let url = Url::parse(raw.trim()).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ProxyError::InvalidUrl(format!(
            "unsupported scheme {:?}",
            scheme
        ))),
    }
}

/// An upstream response whose body has not been consumed yet.
///
/// The underlying connection is owned by the body stream and released when
/// the stream finishes, fails or is dropped.
pub struct UpstreamImage {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    response: Response,
}

impl UpstreamImage {
    fn from_response(response: Response) -> Self {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            status: response.status().as_u16(),
            content_type,
            content_length: response.content_length(),
            response,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The response body as a stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, ProxyError>> + Send + 'static {
        self.response
            .bytes_stream()
            .map_err(|e| ProxyError::Stream(e.to_string()))
    }
}
