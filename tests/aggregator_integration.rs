//! Aggregator Integration Tests
//!
//! Drives the ingestion pipeline against feeds served over real HTTP.

mod common;

use std::time::Duration;

use blogo::aggregator::{Aggregator, CountedTicker, CycleReport};
use blogo::config::AggregatorConfig;
use blogo::feed::FeedRepository;
use blogo::post::PostRepository;
use blogo::rss::{FeedSource, HttpFeedSource};
use blogo::BlogoError;
use chrono::{TimeZone, Utc};
use common::{create_feed, create_user, rss_document, setup_db, FeedServer};

fn test_source() -> HttpFeedSource {
    let config = AggregatorConfig {
        user_agent: "blogo-test/1.0".to_string(),
        request_timeout_secs: 5,
        ..Default::default()
    };
    HttpFeedSource::new(&config).unwrap()
}

#[tokio::test]
async fn test_http_source_fetches_document() {
    let server = FeedServer::start().await;
    server.set(
        "/feed.xml",
        rss_document(
            "Example",
            &[(
                "First",
                "https://example.com/1",
                "&lt;p&gt;Hello&lt;/p&gt;",
                "Mon, 02 Jan 2006 15:04:05 -0700",
            )],
        ),
    );

    let doc = test_source().fetch(&server.url("/feed.xml")).await.unwrap();

    assert_eq!(doc.title, "Example");
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].link, "https://example.com/1");
    assert_eq!(doc.items[0].description, "<p>Hello</p>");
    assert_eq!(doc.items[0].pub_date, "Mon, 02 Jan 2006 15:04:05 -0700");
    assert_eq!(server.user_agents(), ["blogo-test/1.0"]);
}

#[tokio::test]
async fn test_http_source_status_error() {
    let server = FeedServer::start().await;

    let result = test_source().fetch(&server.url("/missing.xml")).await;
    assert!(matches!(result, Err(BlogoError::Network(_))));
}

#[tokio::test]
async fn test_http_source_invalid_document() {
    let server = FeedServer::start().await;
    server.set("/broken.xml", "<html><body>not a feed</body></html>");

    let result = test_source().fetch(&server.url("/broken.xml")).await;
    assert!(matches!(result, Err(BlogoError::Parse(_))));
}

#[tokio::test]
async fn test_http_source_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = test_source().fetch(&format!("http://{addr}/feed.xml")).await;
    assert!(matches!(result, Err(BlogoError::Network(_))));
}

#[tokio::test]
async fn test_ingests_served_feed() {
    let server = FeedServer::start().await;
    server.set(
        "/feed.xml",
        rss_document(
            "Example",
            &[
                (
                    "Tom &amp;amp; Jerry",
                    "https://example.com/1",
                    "&lt;b&gt;bold&lt;/b&gt; move",
                    "Mon, 02 Jan 2006 15:04:05 -0700",
                ),
                ("Undated", "https://example.com/2", "", "sometime"),
            ],
        ),
    );

    let db = setup_db().await;
    let user_id = create_user(&db, "alice").await;
    let feed = create_feed(&db, user_id, "Example", &server.url("/feed.xml")).await;
    let aggregator = Aggregator::new(db.clone(), test_source());

    let report = aggregator.run_once().await.unwrap();
    assert_eq!(
        report,
        CycleReport::Ingested {
            feed_id: feed.id,
            inserted: 2,
            duplicates: 0,
            failed: 0,
        }
    );

    let posts = PostRepository::new(db.pool());
    let first = posts.get_by_url("https://example.com/1").await.unwrap().unwrap();
    assert_eq!(first.title, "Tom & Jerry");
    assert_eq!(first.description.as_deref(), Some("bold move"));
    assert_eq!(
        first.published_at,
        Some(Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap())
    );

    let undated = posts.get_by_url("https://example.com/2").await.unwrap().unwrap();
    assert!(undated.published_at.is_none());
    assert!(undated.description.is_none());
}

#[tokio::test]
async fn test_unchanged_feed_adds_nothing() {
    let server = FeedServer::start().await;
    server.set(
        "/feed.xml",
        rss_document(
            "Example",
            &[("One", "https://example.com/1", "", ""), ("Two", "https://example.com/2", "", "")],
        ),
    );

    let db = setup_db().await;
    let user_id = create_user(&db, "alice").await;
    let feed = create_feed(&db, user_id, "Example", &server.url("/feed.xml")).await;
    let aggregator = Aggregator::new(db.clone(), test_source());

    let cycles = aggregator
        .run_with_ticker(CountedTicker::new(2), std::future::pending())
        .await;
    assert_eq!(cycles, 2);
    assert_eq!(PostRepository::new(db.pool()).count().await.unwrap(), 2);

    // A new item shows up on the next poll; the old ones stay deduplicated.
    server.set(
        "/feed.xml",
        rss_document(
            "Example",
            &[
                ("Three", "https://example.com/3", "", ""),
                ("One", "https://example.com/1", "", ""),
                ("Two", "https://example.com/2", "", ""),
            ],
        ),
    );
    let report = aggregator.run_once().await.unwrap();
    assert_eq!(
        report,
        CycleReport::Ingested {
            feed_id: feed.id,
            inserted: 1,
            duplicates: 2,
            failed: 0,
        }
    );
    assert_eq!(
        PostRepository::new(db.pool())
            .count_by_feed(feed.id)
            .await
            .unwrap(),
        3
    );
}

#[tokio::test]
async fn test_failing_feed_is_rotated_out() {
    let server = FeedServer::start().await;
    server.set(
        "/good.xml",
        rss_document("Good", &[("Post", "https://good.example/1", "", "")]),
    );

    let db = setup_db().await;
    let user_id = create_user(&db, "alice").await;
    let broken = create_feed(&db, user_id, "Broken", &server.url("/gone.xml")).await;
    let good = create_feed(&db, user_id, "Good", &server.url("/good.xml")).await;
    let aggregator = Aggregator::new(db.clone(), test_source());

    let first = aggregator.run_once().await.unwrap();
    assert!(matches!(
        first,
        CycleReport::FetchFailed { feed_id, .. } if feed_id == broken.id
    ));

    let second = aggregator.run_once().await.unwrap();
    assert!(matches!(
        second,
        CycleReport::Ingested { feed_id, inserted: 1, .. } if feed_id == good.id
    ));

    let feeds = FeedRepository::new(db.pool());
    let broken = feeds.get_by_id(broken.id).await.unwrap().unwrap();
    assert!(broken.last_fetched_at.is_some());
    assert_eq!(
        PostRepository::new(db.pool())
            .count_by_feed(broken.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_run_until_stops_on_shutdown() {
    let server = FeedServer::start().await;
    server.set("/feed.xml", rss_document("Example", &[]));

    let db = setup_db().await;
    let user_id = create_user(&db, "alice").await;
    let feed = create_feed(&db, user_id, "Example", &server.url("/feed.xml")).await;
    let aggregator = Aggregator::new(db.clone(), test_source());

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(());
    });

    aggregator
        .run_until(Duration::from_secs(3600), async {
            rx.await.ok();
        })
        .await
        .unwrap();
    stopper.await.unwrap();

    assert_eq!(server.user_agents().len(), 1);
    let feed = FeedRepository::new(db.pool())
        .get_by_id(feed.id)
        .await
        .unwrap()
        .unwrap();
    assert!(feed.was_fetched());
}
