//! Message routing and generation orchestration — the conversational core.
//!
//! Flow: authenticated inbound message → fixed-order rule table → optional
//! defaults-priming interceptor → handler → reply string (or intentional
//! silence). The free-text handler owns the asynchronous rendezvous with
//! the detached generation task via the per-user session mailbox.

mod generate;
mod handlers;

pub mod replies;
pub mod router;
pub mod services;

pub use {
    router::{ChatRouter, Rule},
    services::Services,
};
