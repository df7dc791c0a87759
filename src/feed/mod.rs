//! Feed subscriptions for blogo.
//!
//! Feeds are registered by a user and polled by the aggregator; users follow
//! feeds to see their posts when browsing.

pub mod repository;
pub mod types;

pub use repository::{FeedFollowRepository, FeedRepository};
pub use types::{Feed, FeedFollow, FeedInfo, NewFeed};
