//! Feed types for blogo.

use chrono::{DateTime, Utc};

/// A registered feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    /// Feed ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Feed URL (unique).
    pub url: String,
    /// ID of the user who added the feed.
    pub user_id: i64,
    /// Last fetch attempt; `None` if the feed was never fetched.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When the feed was created.
    pub created_at: DateTime<Utc>,
    /// When the feed was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Feed {
    /// Whether the feed has ever been attempted.
    pub fn was_fetched(&self) -> bool {
        self.last_fetched_at.is_some()
    }
}

/// New feed for creation.
#[derive(Debug, Clone)]
pub struct NewFeed {
    /// Display name.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Owning user ID.
    pub user_id: i64,
}

impl NewFeed {
    /// Create a new feed.
    pub fn new(name: impl Into<String>, url: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            user_id,
        }
    }
}

/// Feed listing entry with the owner's name.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FeedInfo {
    /// Display name.
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Name of the user who added the feed.
    pub owner: String,
}

/// A user following a feed, joined with user and feed details.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FeedFollow {
    /// Follow record ID.
    pub id: i64,
    /// Following user.
    pub user_id: i64,
    /// Followed feed.
    pub feed_id: i64,
    /// Following user's name.
    pub user_name: String,
    /// Followed feed's name.
    pub feed_name: String,
    /// Followed feed's URL.
    pub feed_url: String,
    /// When the follow was created.
    pub created_at: String,
}
