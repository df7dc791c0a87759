//! Feed and feed-follow repositories for blogo.

use chrono::{DateTime, Utc};

use super::types::{Feed, FeedFollow, FeedInfo, NewFeed};
use crate::db::{format_timestamp, parse_timestamp, DbPool};
use crate::{BlogoError, Result};

const FEED_COLUMNS: &str = "id, name, url, user_id, last_fetched_at, created_at, updated_at";

/// Row type for a feed from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: i64,
    name: String,
    url: String,
    user_id: i64,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_timestamp(&s)),
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new feed.
    pub async fn create(&self, feed: &NewFeed) -> Result<Feed> {
        if self.get_by_url(&feed.url).await?.is_some() {
            return Err(BlogoError::Validation(format!(
                "feed \"{}\" already exists",
                feed.url
            )));
        }

        let result = sqlx::query("INSERT INTO feeds (name, url, user_id) VALUES (?, ?, ?)")
            .bind(&feed.name)
            .bind(&feed.url)
            .bind(feed.user_id)
            .execute(self.pool)
            .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| BlogoError::NotFound("feed".into()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?"
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// List all feeds in registration order.
    pub async fn list_all(&self) -> Result<Vec<Feed>> {
        let rows = sqlx::query_as::<_, FeedRow>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Feed::from).collect())
    }

    /// List all feeds together with the name of the user who added each.
    pub async fn list_with_owner(&self) -> Result<Vec<FeedInfo>> {
        let feeds = sqlx::query_as::<_, FeedInfo>(
            r#"
            SELECT f.name AS name, f.url AS url, u.name AS owner
            FROM feeds AS f
            JOIN users AS u ON u.id = f.user_id
            ORDER BY f.id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(feeds)
    }

    /// Get the most overdue feed.
    ///
    /// Never-fetched feeds come first, then the oldest `last_fetched_at`;
    /// ties are broken by feed ID. Returns `None` if no feeds exist.
    pub async fn next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM feeds
            ORDER BY last_fetched_at IS NOT NULL, last_fetched_at ASC, id ASC
            LIMIT 1
            "#
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// Set the last fetched timestamp to now.
    pub async fn mark_fetched_now(&self, id: i64) -> Result<bool> {
        self.set_last_fetched_at(id, Utc::now()).await
    }

    /// Set the last fetched timestamp.
    pub async fn set_last_fetched_at(&self, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE feeds SET last_fetched_at = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(format_timestamp(&at))
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for feed-follow operations.
pub struct FeedFollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedFollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Make a user follow a feed.
    pub async fn create(&self, user_id: i64, feed_id: i64) -> Result<FeedFollow> {
        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM feed_follows WHERE user_id = ? AND feed_id = ?)",
        )
        .bind(user_id)
        .bind(feed_id)
        .fetch_one(self.pool)
        .await?;
        if already {
            return Err(BlogoError::Validation("already following this feed".into()));
        }

        let result = sqlx::query("INSERT INTO feed_follows (user_id, feed_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(feed_id)
            .execute(self.pool)
            .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| BlogoError::NotFound("feed follow".into()))
    }

    /// Get a follow by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FeedFollow>> {
        let follow = sqlx::query_as::<_, FeedFollow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id,
                   u.name AS user_name, f.name AS feed_name, f.url AS feed_url,
                   ff.created_at
            FROM feed_follows AS ff
            JOIN users AS u ON u.id = ff.user_id
            JOIN feeds AS f ON f.id = ff.feed_id
            WHERE ff.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(follow)
    }

    /// List the feeds a user follows.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<FeedFollow>> {
        let follows = sqlx::query_as::<_, FeedFollow>(
            r#"
            SELECT ff.id, ff.user_id, ff.feed_id,
                   u.name AS user_name, f.name AS feed_name, f.url AS feed_url,
                   ff.created_at
            FROM feed_follows AS ff
            JOIN users AS u ON u.id = ff.user_id
            JOIN feeds AS f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY ff.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(follows)
    }

    /// Remove a user's follow of the feed with the given URL.
    pub async fn delete_by_user_and_url(&self, user_id: i64, feed_url: &str) -> Result<()> {
        let feed = FeedRepository::new(self.pool)
            .get_by_url(feed_url)
            .await?
            .ok_or_else(|| BlogoError::NotFound(format!("feed \"{feed_url}\"")))?;

        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed.id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BlogoError::NotFound(format!(
                "follow of feed \"{feed_url}\""
            )));
        }
        Ok(())
    }
}
