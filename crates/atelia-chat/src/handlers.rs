//! Command, image, and event handlers.
//!
//! Handlers are idempotent under platform redelivery (session writes are
//! last-write-wins) and never surface an error: backend failures collapse
//! into a fixed retry reply or an intentional no-reply.

use {
    atelia_common::types::InboundMessage,
    atelia_params::ParamSet,
    tracing::{debug, warn},
};

use crate::{replies, services::Services};

/// `/imgset`: merge the command's trailing tokens onto the persisted
/// defaults, persist when changed, and cache the merged set in the session.
pub(crate) async fn set_params(msg: &InboundMessage, services: &Services) -> Option<String> {
    let user = &msg.from_user;
    match services.directory.is_linked(user).await {
        Ok(true) => {},
        Ok(false) => return Some(replies::LINK_ACCOUNT_FIRST.to_string()),
        Err(e) => {
            warn!(user = %user, "account lookup failed: {e}");
            return Some(replies::RETRY.to_string());
        },
    }

    let trailing = msg
        .text()
        .strip_prefix(replies::CMD_SET_PARAMS)
        .unwrap_or("")
        .trim();
    let updates = ParamSet::parse(trailing);

    let base = match services.defaults.get(user).await {
        Ok(Some(raw)) => ParamSet::from_stored(&raw),
        Ok(None) => ParamSet::default(),
        Err(e) => {
            warn!(user = %user, "defaults load failed: {e}");
            return Some(replies::RETRY.to_string());
        },
    };

    let (changed, merged) = base.merge(&updates);
    if changed {
        if let Err(e) = services.defaults.put(user, &merged.to_stored()).await {
            warn!(user = %user, "defaults save failed: {e}");
            return Some(replies::RETRY.to_string());
        }
    }
    services.sessions.session(user).set_global_params(merged);
    Some(replies::PARAMS_SAVED.to_string())
}

/// `/imgget`: render the effective parameter set, session override first.
/// Unlinked users get no reply.
pub(crate) async fn get_params(msg: &InboundMessage, services: &Services) -> Option<String> {
    let user = &msg.from_user;
    match services.directory.is_linked(user).await {
        Ok(true) => {},
        Ok(false) => return None,
        Err(e) => {
            warn!(user = %user, "account lookup failed: {e}");
            return None;
        },
    }

    let effective = match services.sessions.session(user).global_params() {
        Some(params) => params,
        None => match services.defaults.get(user).await {
            Ok(Some(raw)) => ParamSet::from_stored(&raw),
            Ok(None) => ParamSet::default(),
            Err(e) => {
                warn!(user = %user, "defaults load failed: {e}");
                return None;
            },
        },
    };

    let mut lines = vec![replies::PARAMS_HEADER.to_string()];
    for (key, value) in effective.iter_set() {
        lines.push(format!("{}: {value}", key.code()));
    }
    Some(lines.join("\n"))
}

/// Image delivery: stash the media reference for the next generation.
pub(crate) fn reference_image(msg: &InboundMessage, services: &Services) -> Option<String> {
    let media_ref = msg.media_ref.as_deref()?;
    let previous = services
        .sessions
        .session(&msg.from_user)
        .set_reference_media(media_ref);
    Some(
        if previous.is_some() {
            replies::REFERENCE_REPLACED
        } else {
            replies::REFERENCE_SAVED
        }
        .to_string(),
    )
}

/// "subscribe" event: fire-and-forget registration, errors logged and
/// swallowed, never a reply.
pub(crate) async fn subscribe(msg: &InboundMessage, services: &Services) -> Option<String> {
    if let Err(e) = services.registry.register(&msg.from_user).await {
        warn!(user = %msg.from_user, "subscriber registration failed: {e}");
    }
    None
}

/// Interceptor for the text rule: load persisted defaults into the session
/// before the handler runs. Purely state-priming — always continues.
pub(crate) async fn prime_params(msg: &InboundMessage, services: &Services) -> bool {
    let user = &msg.from_user;
    match services.directory.is_linked(user).await {
        Ok(true) => match services.defaults.get(user).await {
            Ok(Some(raw)) => {
                services
                    .sessions
                    .session(user)
                    .set_global_params(ParamSet::from_stored(&raw));
            },
            Ok(None) => {},
            Err(e) => debug!(user = %user, "defaults load failed, continuing: {e}"),
        },
        Ok(false) => {},
        Err(e) => debug!(user = %user, "account lookup failed, continuing: {e}"),
    }
    true
}
