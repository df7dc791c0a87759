//! Post types for blogo.

use chrono::{DateTime, Utc};

/// A stored post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Post ID.
    pub id: i64,
    /// Title with markup stripped.
    pub title: String,
    /// Post URL (unique across all posts).
    pub url: String,
    /// Description with markup stripped.
    pub description: Option<String>,
    /// Publish time; `None` when the feed's date could not be parsed.
    pub published_at: Option<DateTime<Utc>>,
    /// Feed the post came from.
    pub feed_id: i64,
    /// When the post was stored.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

/// New post for insertion.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_id: i64,
}

impl NewPost {
    /// Create a new post with the required fields.
    pub fn new(feed_id: i64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            published_at: None,
            feed_id,
        }
    }

    /// Set the description; an empty description is stored as `NULL`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    /// Set the publish time.
    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }
}

/// Result of storing a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was written with this ID.
    Inserted(i64),
    /// A post with the same URL already existed; nothing was written.
    DuplicateIgnored,
}

impl UpsertOutcome {
    /// Whether a new row was written.
    pub fn is_inserted(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }
}
