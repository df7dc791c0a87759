//! The ingestion loop: poll one feed per tick and store its posts.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::scheduler::FetchScheduler;
use super::ticker::{IntervalTicker, Ticker};
use crate::db::Database;
use crate::post::{NewPost, PostRepository, UpsertOutcome};
use crate::rss::{normalize_item, strip_markup, FeedSource};
use crate::{BlogoError, Result};

/// What a single aggregation cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// No feeds are registered.
    NoFeeds,
    /// The feed could not be retrieved or parsed; nothing was stored.
    FetchFailed {
        feed_id: i64,
        url: String,
        reason: String,
    },
    /// The feed was fetched and its items were offered to the store.
    Ingested {
        feed_id: i64,
        inserted: usize,
        duplicates: usize,
        failed: usize,
    },
}

/// Polls feeds from a [`FeedSource`] and stores their items as posts.
pub struct Aggregator<S> {
    db: Database,
    source: S,
}

impl<S: FeedSource> Aggregator<S> {
    pub fn new(db: Database, source: S) -> Self {
        Self { db, source }
    }

    /// The feed source in use.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run exactly one cycle against the most overdue feed.
    ///
    /// Fetch failures and per-post storage failures are logged and reported
    /// in the returned [`CycleReport`]. Only a failure to choose a feed is
    /// returned as an error.
    pub async fn run_once(&self) -> Result<CycleReport> {
        let scheduler = FetchScheduler::new(self.db.pool());

        let feed = match scheduler.next_feed().await {
            Ok(feed) => feed,
            Err(BlogoError::NoFeeds) => {
                info!("No feeds to fetch");
                return Ok(CycleReport::NoFeeds);
            }
            Err(e) => return Err(e),
        };

        // Marked before the request so a failing feed still moves to the back.
        if let Err(e) = scheduler.mark_attempted(feed.id).await {
            error!("Failed to mark feed {} as fetched: {}", feed.url, e);
        }

        let document = match self.source.fetch(&feed.url).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to fetch feed {}: {}", feed.url, e);
                return Ok(CycleReport::FetchFailed {
                    feed_id: feed.id,
                    url: feed.url,
                    reason: e.to_string(),
                });
            }
        };

        info!(
            "Fetched feed \"{}\" ({}): {} item(s)",
            strip_markup(&document.title),
            feed.url,
            document.items.len()
        );
        debug!("Feed description: {}", strip_markup(&document.description));

        let posts = PostRepository::new(self.db.pool());
        let (mut inserted, mut duplicates, mut failed) = (0, 0, 0);

        for raw in &document.items {
            let item = normalize_item(raw);
            if item.published_at.is_none() && !raw.pub_date.trim().is_empty() {
                warn!(
                    "Could not parse publish date {:?} of {}",
                    raw.pub_date, item.link
                );
            }

            let post = NewPost::new(feed.id, item.title, item.link)
                .with_description(item.description)
                .with_published_at(item.published_at);

            match posts.upsert(&post).await {
                Ok(UpsertOutcome::Inserted(id)) => {
                    debug!("Stored post {} ({})", id, post.url);
                    inserted += 1;
                }
                Ok(UpsertOutcome::DuplicateIgnored) => duplicates += 1,
                Err(e) => {
                    error!("Failed to save post {}: {}", post.url, e);
                    failed += 1;
                }
            }
        }

        if inserted > 0 {
            info!("Feed {} updated: {} new post(s)", feed.url, inserted);
        } else {
            debug!("Feed {} updated: no new posts", feed.url);
        }

        Ok(CycleReport::Ingested {
            feed_id: feed.id,
            inserted,
            duplicates,
            failed,
        })
    }

    /// Run one cycle now and one per `interval` after that, forever.
    ///
    /// Only returns if the ticker cannot be created.
    pub async fn run_forever(&self, interval: Duration) -> Result<()> {
        self.run_until(interval, std::future::pending()).await
    }

    /// Like [`run_forever`](Self::run_forever), but stops between cycles
    /// once `shutdown` resolves.
    pub async fn run_until<F>(&self, interval: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!("Collecting feeds every {:?}", interval);
        let ticker = IntervalTicker::new(interval)?;
        self.run_with_ticker(ticker, shutdown).await;
        Ok(())
    }

    /// Drive the loop with an explicit ticker.
    ///
    /// A running cycle is never interrupted: `shutdown` is only checked
    /// while waiting for the next tick. Returns the number of cycles run.
    pub async fn run_with_ticker<T, F>(&self, mut ticker: T, shutdown: F) -> usize
    where
        T: Ticker,
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        loop {
            let ticked = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping aggregator");
                    break;
                }
                ticked = ticker.tick() => ticked,
            };
            if !ticked {
                break;
            }

            match self.run_once().await {
                Ok(report) => debug!("Cycle finished: {:?}", report),
                Err(e) => error!("Aggregation cycle failed: {}", e),
            }
            cycles += 1;
        }

        info!("Aggregator stopped after {} cycle(s)", cycles);
        cycles
    }
}
