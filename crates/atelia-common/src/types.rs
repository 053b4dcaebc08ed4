//! Message and outcome types shared between the router, the session store,
//! and the backend boundary.

use serde::{Deserialize, Serialize};

/// What kind of delivery the platform sent us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Event,
}

/// One inbound webhook delivery, already authenticated and decrypted by the
/// platform edge. Immutable for the lifetime of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform identifier of the sender (the session key).
    pub from_user: String,
    /// Platform identifier of the bot account the message was sent to.
    pub to_user: String,
    pub kind: MessageKind,
    /// Message text, present for `Text` deliveries.
    #[serde(default)]
    pub content: Option<String>,
    /// Platform media reference, present for `Image` deliveries.
    #[serde(default)]
    pub media_ref: Option<String>,
    /// Event name, present for `Event` deliveries (e.g. "subscribe").
    #[serde(default)]
    pub event: Option<String>,
}

impl InboundMessage {
    /// Message text, empty if absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Terminal result of one generation attempt.
///
/// Written once by the detached generation task, consumed (and removed) by
/// the next successful poll from a later webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl GenerationOutcome {
    pub fn success(image_urls: Vec<String>, message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            image_urls,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            image_urls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_deserializes_with_missing_optionals() {
        let msg: InboundMessage = serde_json::from_str(
            r#"{"from_user": "u1", "to_user": "bot", "kind": "text", "content": "hi"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.text(), "hi");
        assert!(msg.media_ref.is_none());
        assert!(msg.event.is_none());
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = GenerationOutcome::success(vec!["https://a/1.png".into()], None);
        assert!(ok.success);
        assert_eq!(ok.image_urls.len(), 1);

        let fail = GenerationOutcome::failure("nope");
        assert!(!fail.success);
        assert_eq!(fail.message.as_deref(), Some("nope"));
        assert!(fail.image_urls.is_empty());
    }
}
