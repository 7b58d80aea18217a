//! HTTP retrieval of the published schedule
//!
//! No retry happens here; the schedule poller simply tries again on its
//! next tick.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::document::ScheduleDocument;
use super::error::FetchError;

/// Anything that can hand out the current schedule document
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch(&self) -> Result<ScheduleDocument, FetchError>;
}

/// Fetches the schedule document over HTTP
pub struct ScheduleFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Location of the schedule JSON
    url: Url,
}

impl ScheduleFetcher {
    /// Create a fetcher with a 30 second request timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if `url` does not parse, or
    /// `FetchError::Transport` if the HTTP client cannot be created
    pub fn new(url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(url, Duration::from_secs(30))
    }

    /// Create a fetcher with a custom request timeout
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(format!("playout-controller/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Decode a raw response body into a schedule document
    pub fn decode(body: &[u8]) -> Result<ScheduleDocument, FetchError> {
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ScheduleSource for ScheduleFetcher {
    async fn fetch(&self) -> Result<ScheduleDocument, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let document = Self::decode(&body)?;

        tracing::debug!(
            url = %self.url,
            version = %document.version(),
            days = document.schedule.conference.days.len(),
            "Fetched schedule"
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        let result = ScheduleFetcher::new("not a url");
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_decode_error() {
        let result = ScheduleFetcher::decode(b"{\"nope\": true}");
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_decode_minimal_document() {
        let doc = ScheduleFetcher::decode(br#"{"schedule":{"version":"v7"}}"#).unwrap();
        assert_eq!(doc.version(), "v7");
        assert_eq!(doc.talks().count(), 0);
    }
}
