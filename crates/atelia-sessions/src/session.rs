//! One user's conversational state.

use std::sync::{Mutex, MutexGuard};

use {atelia_common::types::GenerationOutcome, atelia_params::ParamSet};

use crate::mailbox::Mailbox;

#[derive(Debug, Default)]
struct SessionState {
    /// A generation job has been launched and its outcome not yet consumed
    /// by a poll. Only the poll path clears this.
    building: bool,
    /// Pending reference image, set by the image handler and taken by the
    /// generation task (or cancelled by the user).
    reference_media: Option<String>,
    /// Cached effective parameter set, primed from the defaults store.
    global_params: Option<ParamSet>,
}

/// Per-user session. All accessors are linearizable with respect to each
/// other: state sits behind one mutex, held only for the duration of the
/// accessor (never across an await point).
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
    result: Mailbox<GenerationOutcome>,
}

impl Session {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_building(&self) -> bool {
        self.lock().building
    }

    pub fn set_building(&self) {
        self.lock().building = true;
    }

    pub fn clear_building(&self) {
        self.lock().building = false;
    }

    /// Replace the pending reference image, returning the previous one.
    pub fn set_reference_media(&self, media_ref: impl Into<String>) -> Option<String> {
        self.lock().reference_media.replace(media_ref.into())
    }

    /// Remove and return the pending reference image.
    pub fn take_reference_media(&self) -> Option<String> {
        self.lock().reference_media.take()
    }

    pub fn has_reference_media(&self) -> bool {
        self.lock().reference_media.is_some()
    }

    pub fn global_params(&self) -> Option<ParamSet> {
        self.lock().global_params.clone()
    }

    pub fn set_global_params(&self, params: ParamSet) {
        self.lock().global_params = Some(params);
    }

    /// The result hand-off slot shared with the generation task.
    pub fn result(&self) -> &Mailbox<GenerationOutcome> {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_flag() {
        let session = Session::default();
        assert!(!session.is_building());
        session.set_building();
        assert!(session.is_building());
        session.clear_building();
        assert!(!session.is_building());
    }

    #[test]
    fn test_reference_media_replace_and_take() {
        let session = Session::default();
        assert_eq!(session.set_reference_media("m1"), None);
        assert_eq!(session.set_reference_media("m2"), Some("m1".into()));
        assert_eq!(session.take_reference_media(), Some("m2".into()));
        assert_eq!(session.take_reference_media(), None);
    }

    #[test]
    fn test_result_slot_is_consumed_once() {
        let session = Session::default();
        session
            .result()
            .put(GenerationOutcome::failure("bad"));
        assert!(session.result().take().is_some());
        assert!(session.result().take().is_none());
    }
}
