//! Boundary to the external collaborators: the generation service, the
//! intent assessor, the platform media host, the persisted defaults store,
//! and the subscriber registry.
//!
//! The chat core only sees the traits in [`api`]; [`http`] carries the
//! reqwest implementations against the backend's REST surface.

pub mod api;
pub mod error;
pub mod http;

pub use {
    api::{
        AccountDirectory, DefaultsStore, GenerationBackend, GenerationRequest, IntentAssessment,
        IntentAssessor, MediaFetcher, SubscriberRegistry,
    },
    error::{Error, Result},
    http::{HttpBackend, HttpMediaFetcher},
};
