//! Feed fetching over HTTP.
//!
//! A fetch is one GET request followed by an RSS parse. Nothing is stored;
//! the caller decides what to do with the document.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::types::{RawFeedDocument, RawItem};
use crate::config::AggregatorConfig;
use crate::{BlogoError, Result};

/// Something that can turn a feed URL into a parsed document.
///
/// Fails with [`BlogoError::Network`] when the document could not be
/// retrieved and with [`BlogoError::Parse`] when it is not a valid feed.
/// A partial document is never returned.
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawFeedDocument>> + Send;
}

/// Feed source backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Create a source using the configured user agent and timeout.
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| BlogoError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<RawFeedDocument> {
        debug!("Fetching feed {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BlogoError::Network(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BlogoError::Network(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BlogoError::Network(format!("failed to read response: {}", e)))?;

        parse_document(&bytes)
    }
}

/// Parse an RSS document.
///
/// Unknown elements are ignored and missing fields become empty strings.
pub fn parse_document(bytes: &[u8]) -> Result<RawFeedDocument> {
    let channel = ::rss::Channel::read_from(bytes)
        .map_err(|e| BlogoError::Parse(format!("failed to parse feed: {}", e)))?;

    let items = channel
        .items()
        .iter()
        .map(|item| RawItem {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().unwrap_or_default().to_string(),
            description: item.description().unwrap_or_default().to_string(),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    Ok(RawFeedDocument {
        title: channel.title().to_string(),
        link: channel.link().to_string(),
        description: channel.description().to_string(),
        items,
    })
}
