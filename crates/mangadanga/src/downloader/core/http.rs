//! HTTP utilities
//!
//! One shared `reqwest` client for a run. Every request carries the default
//! header set (user agent, accept-encoding) plus the headers of the driver it
//! is issued for. Non-success statuses are turned into errors here so callers
//! only ever see successful bodies.

use reqwest::Client;
use reqwest::header::{ACCEPT_ENCODING, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use crate::downloader::config::DownloaderConfig;
use crate::downloader::core::{DownloadError, HtmlDocument, Result};

/// HTTP client shared by every fetch of a run
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    /// Delay before each retry; empty when retrying is disabled
    retry_delays: Vec<Duration>,
}

impl HttpClient {
    /// Create a new HTTP client from download configuration
    pub fn from_config(config: &DownloaderConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(default_headers)
            .build()
            .map_err(|e| DownloadError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                field: None,
                suggestion: None,
            })?;

        Ok(Self {
            client,
            timeout: config.timeout,
            retry_delays: (0..config.max_retries).map(|attempt| config.get_retry_delay(attempt)).collect(),
        })
    }

    /// Turn `(name, value)` pairs into a header map
    pub fn header_map(headers: &[(&str, String)]) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let invalid = |detail: String| DownloadError::Configuration {
                message: format!("Invalid request header '{}': {}", name, detail),
                field: Some("request_headers".to_string()),
                suggestion: None,
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Fetch `url` as an HTML document
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub async fn get_document(&self, url: &str, headers: &HeaderMap) -> Result<HtmlDocument> {
        let (final_url, body) = self.fetch(url, headers).await?;
        Ok(HtmlDocument::new(final_url, String::from_utf8_lossy(&body).into_owned()))
    }

    /// Fetch `url` as raw bytes
    pub async fn get_bytes(&self, url: &str, headers: &HeaderMap) -> Result<Vec<u8>> {
        let (_, body) = self.fetch(url, headers).await?;
        Ok(body)
    }

    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<(url::Url, Vec<u8>)> {
        if self.retry_delays.is_empty() {
            return self.fetch_once(url, headers).await;
        }

        RetryIf::start(
            self.retry_delays.clone(),
            || self.fetch_once(url, headers),
            |error: &DownloadError| {
                let retry = error.is_recoverable();
                if retry {
                    warn!("Retrying {} after error: {}", url, error);
                }
                retry
            },
        )
        .await
    }

    async fn fetch_once(&self, url: &str, headers: &HeaderMap) -> Result<(url::Url, Vec<u8>)> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.bytes().await.map_err(|e| self.request_error(url, e))?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok((final_url, body.to_vec()))
    }

    fn request_error(&self, url: &str, error: reqwest::Error) -> DownloadError {
        if error.is_timeout() {
            DownloadError::NetworkTimeout {
                url: url.to_string(),
                duration_secs: self.timeout.as_secs(),
            }
        } else if error.is_builder() {
            match url::Url::parse(url) {
                Err(parse_error) => DownloadError::invalid_url(url, parse_error),
                Ok(_) => DownloadError::HttpRequest { url: url.to_string(), source: error },
            }
        } else {
            DownloadError::HttpRequest {
                url: url.to_string(),
                source: error,
            }
        }
    }
}
