//! Choosing which feed to poll next.

use tracing::debug;

use crate::db::DbPool;
use crate::feed::{Feed, FeedRepository};
use crate::{BlogoError, Result};

/// Picks the most overdue feed and records fetch attempts.
pub struct FetchScheduler<'a> {
    feeds: FeedRepository<'a>,
}

impl<'a> FetchScheduler<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            feeds: FeedRepository::new(pool),
        }
    }

    /// The feed to poll next.
    ///
    /// Never-fetched feeds come before every fetched one, then the oldest
    /// attempt wins; ties go to the lowest feed ID. Fails with
    /// [`BlogoError::NoFeeds`] when no feeds are registered.
    pub async fn next_feed(&self) -> Result<Feed> {
        let feed = self.feeds.next_to_fetch().await?.ok_or(BlogoError::NoFeeds)?;
        debug!(
            "Next feed to fetch: {} ({}), last fetched {:?}",
            feed.id, feed.url, feed.last_fetched_at
        );
        Ok(feed)
    }

    /// Record a fetch attempt now, whatever its outcome will be.
    pub async fn mark_attempted(&self, feed_id: i64) -> Result<()> {
        if self.feeds.mark_fetched_now(feed_id).await? {
            Ok(())
        } else {
            Err(BlogoError::NotFound(format!("feed {feed_id}")))
        }
    }
}
