//! Post repository for blogo.

use chrono::{SecondsFormat, Utc};

use super::types::{NewPost, Post, UpsertOutcome};
use crate::db::{parse_timestamp, DbPool};
use crate::Result;

const POST_COLUMNS: &str =
    "p.id, p.title, p.url, p.description, p.published_at, p.feed_id, p.created_at, p.updated_at";

/// Row type for a post from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    url: String,
    description: Option<String>,
    published_at: Option<String>,
    feed_id: i64,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: row.published_at.and_then(|s| parse_timestamp(&s)),
            feed_id: row.feed_id,
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a post unless one with the same URL already exists.
    ///
    /// An existing URL is not an error; the stored row is left unchanged.
    pub async fn upsert(&self, post: &NewPost) -> Result<UpsertOutcome> {
        let published_at = post
            .published_at
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true));

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, url, description, published_at, feed_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(&published_at)
        .bind(post.feed_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            Ok(UpsertOutcome::Inserted(result.last_insert_rowid()))
        } else {
            Ok(UpsertOutcome::DuplicateIgnored)
        }
    }

    /// Get a post by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts AS p WHERE p.url = ?"
        ))
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    /// List the newest posts from the feeds a user follows.
    ///
    /// Posts without a publish time sort after all dated posts.
    pub async fn list_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts AS p
            JOIN feed_follows AS ff ON ff.feed_id = p.feed_id
            WHERE ff.user_id = ?
            ORDER BY p.published_at IS NULL, p.published_at DESC, p.id DESC
            LIMIT ?
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Count all posts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count the posts of one feed.
    pub async fn count_by_feed(&self, feed_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
