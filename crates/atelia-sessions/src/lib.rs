//! Per-user conversational state.
//!
//! Sessions live for the lifetime of the process and are the single point
//! of hand-off between a webhook request task and the detached generation
//! task it spawns. Entries are only ever removed explicitly by handlers.

pub mod mailbox;
pub mod session;
pub mod store;

pub use {mailbox::Mailbox, session::Session, store::SessionStore};
