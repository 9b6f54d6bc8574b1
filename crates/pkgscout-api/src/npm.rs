use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const NPM_REGISTRY_BASE: &str = "https://registry.npmjs.org";

#[derive(Error, Debug)]
pub enum NpmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NpmError>;

/// Client for the npm registry search endpoint
pub struct NpmClient {
    client: reqwest::Client,
    base_url: String,
}

impl NpmClient {
    /// Point at npm itself, a mirror, or a local server in tests
    pub fn with_base_url(base_url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("pkgscout/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/-/v1/search", self.base_url)
    }

    /// Fetch one page of search results.
    ///
    /// `from` is the zero-based offset into the full result list, so page `n`
    /// of size `s` lives at `from = n * s`.
    pub async fn search(&self, text: &str, size: u32, from: u32) -> Result<NpmSearchResponse> {
        let url = self.search_url();
        debug!("GET {} text={} size={} from={}", url, text, size, from);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("text", text),
                ("size", &size.to_string()),
                ("from", &from.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(NpmError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NpmError::RequestFailed(format!(
                "Status {}: {}",
                status, body
            )));
        }

        // Decode through serde_json so a malformed body surfaces as ParseError
        let bytes = response.bytes().await?;
        parse_search_response(&bytes)
    }
}

/// Decode a raw search response body
pub fn parse_search_response(body: &[u8]) -> Result<NpmSearchResponse> {
    Ok(serde_json::from_slice(body)?)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpmSearchResponse {
    pub objects: Vec<NpmSearchObject>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpmSearchObject {
    pub package: NpmPackage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpmPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub links: NpmLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpmLinks {
    pub npm: Option<String>,
}
