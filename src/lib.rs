//! blogo - a personal feed aggregator.
//!
//! Users register, add and follow RSS feeds, and the aggregator polls one
//! feed per tick, normalizes its items and stores them as posts in SQLite.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod post;
pub mod rss;

pub use crate::aggregator::{parse_interval, Aggregator, CycleReport, FetchScheduler};
pub use crate::config::Config;
pub use crate::db::{Database, User, UserRepository};
pub use crate::error::{BlogoError, Result};
pub use crate::feed::{Feed, FeedFollowRepository, FeedRepository, NewFeed};
pub use crate::post::{NewPost, Post, PostRepository, UpsertOutcome};
pub use crate::rss::{FeedSource, HttpFeedSource, RawFeedDocument, RawItem};
