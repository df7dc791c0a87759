//! Feed document types for blogo.

use chrono::{DateTime, Utc};

/// A parsed feed document, before normalization.
///
/// Fields missing from the document are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedDocument {
    /// Channel title.
    pub title: String,
    /// Channel link.
    pub link: String,
    /// Channel description.
    pub description: String,
    /// Items in document order.
    pub items: Vec<RawItem>,
}

/// A feed item as it appears in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Publish date exactly as written in the feed.
    pub pub_date: String,
}

impl RawItem {
    /// Create an item with a title and link.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the raw publish date.
    pub fn with_pub_date(mut self, pub_date: impl Into<String>) -> Self {
        self.pub_date = pub_date.into();
        self
    }
}

/// A feed item with markup stripped and its date parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub title: String,
    /// Link, unchanged from the document.
    pub link: String,
    pub description: String,
    /// `None` when the raw date matched no known layout.
    pub published_at: Option<DateTime<Utc>>,
}
