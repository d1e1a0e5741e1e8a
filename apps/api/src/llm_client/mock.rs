//! Local stand-in for the Messages endpoint, serving canned replies in order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use super::LlmClient;

/// A successful reply whose text is a small analysis document.
pub(crate) const OK_ANALYSIS: &str = r#"{
    "content": [{"type": "text", "text": "```json\n{\"summary\": \"Rust backend engineer\", \"skills\": [\"Rust\", \"Tokio\"]}\n```"}],
    "usage": {"input_tokens": 120, "output_tokens": 30}
}"#;

#[derive(Clone)]
struct Replies {
    script: Arc<Vec<(u16, &'static str)>>,
    hits: Arc<AtomicUsize>,
}

pub(crate) struct MockApi {
    endpoint: String,
    hits: Arc<AtomicUsize>,
}

impl MockApi {
    /// Serves `script` one reply per request; the last entry repeats.
    pub(crate) async fn start(script: Vec<(u16, &'static str)>) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let replies = Replies {
            script: Arc::new(script),
            hits: Arc::clone(&hits),
        };
        let app = Router::new()
            .route("/v1/messages", post(reply))
            .with_state(replies);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{addr}/v1/messages"),
            hits,
        }
    }

    pub(crate) fn client(&self) -> LlmClient {
        LlmClient::with_endpoint("sk-test".to_string(), &self.endpoint)
            .unwrap()
            .with_retry_delay(Duration::from_millis(5))
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn reply(State(replies): State<Replies>) -> impl IntoResponse {
    let n = replies.hits.fetch_add(1, Ordering::SeqCst);
    let (status, body) = replies.script[n.min(replies.script.len() - 1)];
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}
