//! The fixed-order dispatch table.
//!
//! Rules are a closed sum type evaluated top to bottom against the raw
//! message; the first match wins and exactly one handler runs. A message
//! matching no rule is suppressed (no reply).

use std::sync::Arc;

use {
    atelia_common::types::{InboundMessage, MessageKind},
    tracing::debug,
};

use crate::{generate, handlers, replies, services::Services};

/// One entry in the dispatch table. Order of the variants below is the
/// routing priority: command prefixes before generic text, the command
/// fallback between them, event rules independent of message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `/imgset ...` — write persisted generation defaults.
    SetParams,
    /// `/imgget` — read back the effective parameter set.
    GetParams,
    /// Any other leading `/` — reject-all fallback for the command namespace.
    UnknownCommand,
    /// Plain text: intent check + generation orchestration. Primes the
    /// session with persisted defaults before the handler runs.
    Text,
    /// Image delivery: stash a reference image for the next generation.
    Image,
    /// Platform "subscribe" event: welcome/registration.
    Subscribe,
}

impl Rule {
    /// Routing priority, top to bottom.
    pub const ORDERED: [Rule; 6] = [
        Rule::SetParams,
        Rule::GetParams,
        Rule::UnknownCommand,
        Rule::Text,
        Rule::Image,
        Rule::Subscribe,
    ];

    pub fn matches(self, msg: &InboundMessage) -> bool {
        match self {
            Rule::SetParams => {
                msg.kind == MessageKind::Text && msg.text().starts_with(replies::CMD_SET_PARAMS)
            },
            Rule::GetParams => {
                msg.kind == MessageKind::Text && msg.text().starts_with(replies::CMD_GET_PARAMS)
            },
            Rule::UnknownCommand => msg.kind == MessageKind::Text && msg.text().starts_with('/'),
            Rule::Text => msg.kind == MessageKind::Text,
            Rule::Image => msg.kind == MessageKind::Image,
            Rule::Subscribe => {
                msg.kind == MessageKind::Event && msg.event.as_deref() == Some("subscribe")
            },
        }
    }

    /// Whether a state-priming interceptor runs before this rule's handler.
    fn has_interceptor(self) -> bool {
        matches!(self, Rule::Text)
    }
}

/// Evaluates the rule table and executes the selected handler.
///
/// Dispatch itself is stateless; all conversational state lives in the
/// session store. Nothing here ever surfaces an error to the transport:
/// every path ends in a reply string or an intentional no-reply.
pub struct ChatRouter {
    services: Arc<Services>,
}

impl ChatRouter {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    pub async fn dispatch(&self, msg: &InboundMessage) -> Option<String> {
        let rule = Rule::ORDERED.into_iter().find(|r| r.matches(msg))?;
        debug!(?rule, from = %msg.from_user, "dispatching");

        if rule.has_interceptor() && !handlers::prime_params(msg, &self.services).await {
            return None;
        }

        match rule {
            Rule::SetParams => handlers::set_params(msg, &self.services).await,
            Rule::GetParams => handlers::get_params(msg, &self.services).await,
            Rule::UnknownCommand => Some(replies::UNKNOWN_COMMAND.to_string()),
            Rule::Text => generate::handle_text(msg, &self.services).await,
            Rule::Image => handlers::reference_image(msg, &self.services),
            Rule::Subscribe => handlers::subscribe(msg, &self.services).await,
        }
    }
}
