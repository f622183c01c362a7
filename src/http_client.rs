use std::time::Duration;

use reqwest::Client;

use crate::error::{Result, ValidationError};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("xml-validate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Body and Content-Type of a fetched remote document.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Async HTTP client for downloading remote XML documents and schemas.
///
/// A single request per input, no retries: each invocation of the tool is a
/// pure function of its two inputs, and a failed download is reported
/// immediately as an input error.
pub struct AsyncHttpClient {
    client: Client,
}

impl AsyncHttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .map_err(ValidationError::from)?;

        Ok(Self { client })
    }

    /// Fetch `url`, returning the body and its Content-Type header.
    ///
    /// Non-2xx responses become `ValidationError::HttpStatus`.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ValidationError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let data = response.bytes().await?.to_vec();

        Ok(FetchedDocument { data, content_type })
    }
}
