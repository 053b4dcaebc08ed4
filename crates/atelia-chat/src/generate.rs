//! The free-text handler and its generation orchestration.
//!
//! One webhook call launches a detached generation task; a *later* webhook
//! call from the same user observes the outcome through the session's
//! single-slot mailbox. The only deliberate wait in the whole core is the
//! bounded poll loop below.

use std::{sync::Arc, time::Duration};

use {
    atelia_backend::GenerationRequest,
    atelia_common::types::{GenerationOutcome, InboundMessage},
    atelia_sessions::Session,
    tracing::{debug, info, warn},
};

use crate::{replies, services::Services};

/// Bounded poll window: 6 checks spaced 500 ms apart, ~3 s total. A webhook
/// call never waits longer than this.
const POLL_ATTEMPTS: u32 = 6;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub(crate) async fn handle_text(msg: &InboundMessage, services: &Arc<Services>) -> Option<String> {
    let user = msg.from_user.clone();
    let session = services.sessions.session(&user);
    let text = msg.text();

    // Intent gate, only when nothing is pending and nothing is unread.
    if !session.is_building() && session.result().is_empty() {
        match services.intent.assess(&user, text).await {
            Ok(assessment) if !assessment.generate_intent => {
                debug!(user = %user, "no generation intent, guiding");
                return Some(assessment.guide_message.unwrap_or_default());
            },
            Ok(_) => {},
            Err(e) => {
                warn!(user = %user, "intent assessment failed: {e}");
                return Some(replies::RETRY.to_string());
            },
        }
    }

    // Cancel keyword only acts on a pending reference image; otherwise it
    // is a silent no-op.
    if text == replies::CANCEL_KEYWORD {
        return session
            .take_reference_media()
            .map(|_| replies::REFERENCE_CANCELLED.to_string());
    }

    if let Some(reply) = poll_result(&session).await {
        return Some(reply);
    }

    // Fresh generation: mark the session, detach the task, answer at once.
    session.set_building();
    let prompt = text.to_string();
    let services = Arc::clone(services);
    let session_bg = Arc::clone(&session);
    tokio::spawn(async move {
        run_generation(services, session_bg, user, prompt).await;
    });
    Some(replies::GENERATING.to_string())
}

/// Wait for a pending generation's outcome, bounded.
///
/// Returns `None` when no generation is pending (including the case where
/// `building` was cleared while we slept), handing control back to the
/// fresh-start path. An exhausted window leaves `building` set so the next
/// inbound message polls again.
async fn poll_result(session: &Session) -> Option<String> {
    for _ in 0..POLL_ATTEMPTS {
        if !session.is_building() {
            return None;
        }
        if let Some(outcome) = session.result().take() {
            session.clear_building();
            return Some(replies::render_outcome(&outcome));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    Some(replies::STILL_GENERATING.to_string())
}

/// The detached generation task.
///
/// Everything here happens off the request path. `building` is left set on
/// every exit — only the poll path clears it.
async fn run_generation(
    services: Arc<Services>,
    session: Arc<Session>,
    user: String,
    prompt: String,
) {
    let reference_image = match session.take_reference_media() {
        Some(media_ref) => {
            debug!(user = %user, media_ref, "downloading reference image");
            match services.media.fetch(&media_ref).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(user = %user, media_ref, "reference image download failed: {e}");
                    deposit(
                        &session,
                        &user,
                        GenerationOutcome::failure(replies::REFERENCE_DOWNLOAD_FAILED),
                    );
                    return;
                },
            }
        },
        None => None,
    };

    let request = GenerationRequest {
        user_id: user.clone(),
        prompt,
        reference_image,
        params: session.global_params().unwrap_or_default(),
    };
    let outcome = match services.generator.generate(request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(user = %user, "generation call failed: {e}");
            GenerationOutcome::failure(replies::GENERATION_FAILED)
        },
    };
    info!(user = %user, success = outcome.success, "generation finished");
    deposit(&session, &user, outcome);
}

fn deposit(session: &Session, user: &str, outcome: GenerationOutcome) {
    if session.result().put(outcome) {
        // The user never fetched the previous result; it is gone now.
        warn!(user = %user, "displaced an unconsumed generation result");
    }
}
