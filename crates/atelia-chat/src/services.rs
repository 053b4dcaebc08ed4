//! The collaborator bundle handlers dispatch against.

use std::sync::Arc;

use {
    atelia_backend::{
        AccountDirectory, DefaultsStore, GenerationBackend, IntentAssessor, MediaFetcher,
        SubscriberRegistry,
    },
    atelia_sessions::SessionStore,
};

/// Everything a handler may touch: the external collaborators behind their
/// boundary traits, plus the in-process session store.
#[derive(Clone)]
pub struct Services {
    pub generator: Arc<dyn GenerationBackend>,
    pub intent: Arc<dyn IntentAssessor>,
    pub media: Arc<dyn MediaFetcher>,
    pub defaults: Arc<dyn DefaultsStore>,
    pub directory: Arc<dyn AccountDirectory>,
    pub registry: Arc<dyn SubscriberRegistry>,
    pub sessions: Arc<SessionStore>,
}
