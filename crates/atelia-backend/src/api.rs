//! Collaborator traits the chat core dispatches against.

use {
    async_trait::async_trait,
    atelia_common::types::GenerationOutcome,
    atelia_params::ParamSet,
};

use crate::error::Result;

/// One generation submission.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Platform user the call is made on behalf of (backend authorization).
    pub user_id: String,
    /// Free-text prompt from the message body.
    pub prompt: String,
    /// Optional reference image bytes, already resolved from the platform.
    pub reference_image: Option<Vec<u8>>,
    /// Effective generation parameters at submit time.
    pub params: ParamSet,
}

/// Result of the intent pre-check on a free-text message.
#[derive(Debug, Clone)]
pub struct IntentAssessment {
    pub generate_intent: bool,
    pub guide_message: Option<String>,
}

/// Submits generation jobs to the image backend.
///
/// `Ok` carries the backend's own verdict — declared failures come back as
/// a failure [`GenerationOutcome`], not as `Err`. `Err` is transport only.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome>;
}

/// Classifies whether a free-text message asks for a generation.
#[async_trait]
pub trait IntentAssessor: Send + Sync {
    async fn assess(&self, user_id: &str, text: &str) -> Result<IntentAssessment>;
}

/// Resolves a platform media reference to raw image bytes.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, media_ref: &str) -> Result<Vec<u8>>;
}

/// Persisted per-user generation defaults, opaque blob in, opaque blob out.
#[async_trait]
pub trait DefaultsStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<String>>;
    async fn put(&self, user_id: &str, raw: &str) -> Result<()>;
}

/// Answers whether a platform identity is linked to an account.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn is_linked(&self, user_id: &str) -> Result<bool>;
}

/// Fire-and-forget registration on the platform "subscribe" event.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    async fn register(&self, user_id: &str) -> Result<()>;
}
