//! Posts ingested from feeds.
//!
//! Posts are de-duplicated by URL: storing a post whose URL already exists
//! leaves the stored row untouched.

pub mod repository;
pub mod types;

pub use repository::PostRepository;
pub use types::{NewPost, Post, UpsertOutcome};
