//! Feed polling and ingestion.
//!
//! Each cycle picks the most overdue feed with the [`FetchScheduler`],
//! fetches it through a [`FeedSource`](crate::rss::FeedSource), and stores
//! its items as posts. The [`Aggregator`] repeats cycles on a fixed period.

pub mod interval;
pub mod pipeline;
pub mod scheduler;
pub mod ticker;

pub use interval::parse_interval;
pub use pipeline::{Aggregator, CycleReport};
pub use scheduler::FetchScheduler;
pub use ticker::{CountedTicker, IntervalTicker, Ticker};
