//! The webhook intake router.
//!
//! The platform edge delivers one authenticated, already-decrypted message
//! per POST and expects the reply body inline. An empty body tells the
//! platform there is nothing to say.

use std::sync::Arc;

use {
    axum::{
        Router,
        extract::{Json, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
    },
    tracing::info,
};

use {atelia_chat::ChatRouter, atelia_common::types::InboundMessage};

// ── Shared app state ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatRouter>,
}

// ── Router construction ─────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(chat: Arc<ChatRouter>) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { chat })
}

async fn webhook_handler(
    State(state): State<AppState>,
    Json(msg): Json<InboundMessage>,
) -> impl IntoResponse {
    info!(from = %msg.from_user, kind = ?msg.kind, "webhook delivery");
    match state.chat.dispatch(&msg).await {
        Some(reply) => (StatusCode::OK, reply),
        None => (StatusCode::OK, String::new()),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use {
        async_trait::async_trait,
        atelia_backend::{
            AccountDirectory, DefaultsStore, GenerationBackend, GenerationRequest,
            IntentAssessment, IntentAssessor, MediaFetcher, SubscriberRegistry,
        },
        atelia_chat::{Services, replies},
        atelia_common::types::GenerationOutcome,
        atelia_sessions::SessionStore,
        axum::{
            body::Body,
            http::{Request, header},
        },
        tower::ServiceExt,
    };

    use super::*;

    /// One stub standing in for every collaborator trait.
    struct StubBackend;

    #[async_trait]
    impl GenerationBackend for StubBackend {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> atelia_backend::Result<GenerationOutcome> {
            Ok(GenerationOutcome::success(vec![], None))
        }
    }

    #[async_trait]
    impl IntentAssessor for StubBackend {
        async fn assess(
            &self,
            _user_id: &str,
            _text: &str,
        ) -> atelia_backend::Result<IntentAssessment> {
            Ok(IntentAssessment {
                generate_intent: false,
                guide_message: Some("describe a scene".into()),
            })
        }
    }

    #[async_trait]
    impl MediaFetcher for StubBackend {
        async fn fetch(&self, _media_ref: &str) -> atelia_backend::Result<Vec<u8>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl DefaultsStore for StubBackend {
        async fn get(&self, _user_id: &str) -> atelia_backend::Result<Option<String>> {
            Ok(None)
        }

        async fn put(&self, _user_id: &str, _raw: &str) -> atelia_backend::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl AccountDirectory for StubBackend {
        async fn is_linked(&self, _user_id: &str) -> atelia_backend::Result<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl SubscriberRegistry for StubBackend {
        async fn register(&self, _user_id: &str) -> atelia_backend::Result<()> {
            Ok(())
        }
    }

    fn test_app() -> Router {
        let stub = Arc::new(StubBackend);
        let services = Arc::new(Services {
            generator: Arc::clone(&stub) as _,
            intent: Arc::clone(&stub) as _,
            media: Arc::clone(&stub) as _,
            defaults: Arc::clone(&stub) as _,
            directory: Arc::clone(&stub) as _,
            registry: stub as _,
            sessions: Arc::new(SessionStore::new()),
        });
        build_app(Arc::new(ChatRouter::new(services)))
    }

    fn webhook_request(json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("ok"));
    }

    #[tokio::test]
    async fn test_webhook_returns_the_reply_inline() {
        let response = test_app()
            .oneshot(webhook_request(
                r#"{"from_user": "u1", "to_user": "bot", "kind": "text", "content": "/bogus"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, replies::UNKNOWN_COMMAND);
    }

    #[tokio::test]
    async fn test_webhook_suppressed_reply_is_an_empty_body() {
        let response = test_app()
            .oneshot(webhook_request(
                r#"{"from_user": "u1", "to_user": "bot", "kind": "event", "event": "unsubscribe"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_webhook_rejects_malformed_payloads() {
        let response = test_app()
            .oneshot(webhook_request(r#"{"from_user": "u1"}"#))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::OK);
    }
}
