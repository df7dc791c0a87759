//! Feed retrieval and normalization.
//!
//! [`fetcher`] turns a URL into a [`RawFeedDocument`]; [`normalize`] cleans
//! up the text and dates of each item before it is stored.

pub mod fetcher;
pub mod normalize;
pub mod types;

pub use fetcher::{parse_document, FeedSource, HttpFeedSource};
pub use normalize::{normalize_item, parse_publish_date, strip_markup};
pub use types::{NormalizedItem, RawFeedDocument, RawItem};
