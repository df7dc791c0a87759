//! Test helpers for integration tests.
//!
//! Provides a local HTTP server that serves feed documents, plus database
//! setup helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use blogo::db::UserRepository;
use blogo::feed::{Feed, FeedRepository, NewFeed};
use blogo::Database;

/// Build an RSS document from `(title, link, description, pub_date)` items.
pub fn rss_document(title: &str, items: &[(&str, &str, &str, &str)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n\
         <title>{title}</title>\n<link>https://example.com</link>\n\
         <description>Test feed</description>\n"
    );
    for (item_title, link, description, pub_date) in items {
        xml.push_str(&format!(
            "<item><title>{item_title}</title><link>{link}</link>\
             <description>{description}</description><pubDate>{pub_date}</pubDate></item>\n"
        ));
    }
    xml.push_str("</channel>\n</rss>\n");
    xml
}

#[derive(Default)]
struct ServerState {
    documents: Mutex<HashMap<String, String>>,
    user_agents: Mutex<Vec<String>>,
}

/// Local HTTP server serving feed documents by path.
///
/// Unknown paths answer 404.
pub struct FeedServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FeedServer {
    /// Start a server on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .fallback(serve_document)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Serve `body` at `path`, replacing any previous document.
    pub fn set(&self, path: &str, body: impl Into<String>) {
        self.state
            .documents
            .lock()
            .unwrap()
            .insert(path.to_string(), body.into());
    }

    /// Absolute URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// User-Agent headers of all requests received so far.
    pub fn user_agents(&self) -> Vec<String> {
        self.state.user_agents.lock().unwrap().clone()
    }
}

impl Drop for FeedServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_document(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    if let Some(agent) = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        state.user_agents.lock().unwrap().push(agent.to_string());
    }

    let body = state.documents.lock().unwrap().get(uri.path()).cloned();
    match body {
        Some(body) => ([(CONTENT_TYPE, "application/rss+xml")], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Open an in-memory database.
pub async fn setup_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

/// Register a user and return its ID.
pub async fn create_user(db: &Database, name: &str) -> i64 {
    UserRepository::new(db.pool()).create(name).await.unwrap().id
}

/// Register a feed owned by `user_id`.
pub async fn create_feed(db: &Database, user_id: i64, name: &str, url: &str) -> Feed {
    FeedRepository::new(db.pool())
        .create(&NewFeed::new(name, url, user_id))
        .await
        .unwrap()
}
