//! services/client/src/session/store.rs
//!
//! In-memory per-study bookkeeping: each study's message history and backend
//! session token, keyed by the study's stable id.

use std::collections::HashMap;
use study_tutor_core::domain::{Message, SessionToken};
use uuid::Uuid;

/// Keyed storage for per-study conversation state.
///
/// There is no eviction: the store is scoped to one application session and
/// grows with the studies the user opens.
#[derive(Debug, Default)]
pub struct StudySessionStore {
    messages: HashMap<Uuid, Vec<Message>>,
    tokens: HashMap<Uuid, SessionToken>,
}

impl StudySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached message history for a study, empty if none was flushed.
    pub fn messages(&self, study_id: Uuid) -> &[Message] {
        self.messages.get(&study_id).map_or(&[], Vec::as_slice)
    }

    /// Replaces a study's cached history wholesale. Switching the active
    /// study flushes its full buffer through here, so replace semantics
    /// (not append) are what keeps histories loss-free across switches.
    pub fn set_messages(&mut self, study_id: Uuid, messages: Vec<Message>) {
        self.messages.insert(study_id, messages);
    }

    pub fn token(&self, study_id: Uuid) -> Option<&SessionToken> {
        self.tokens.get(&study_id)
    }

    /// Records the backend-issued token for a study. Called once per
    /// backend-issued token; an existing token is overwritten only when the
    /// backend forces a new session.
    pub fn set_token(&mut self, study_id: Uuid, token: SessionToken) {
        self.tokens.insert(study_id, token);
    }

    /// Whether a study has any cached state at all. A study with neither a
    /// token nor messages was never actually initialized.
    pub fn is_initialized(&self, study_id: Uuid) -> bool {
        self.tokens.contains_key(&study_id)
            || self.messages.get(&study_id).is_some_and(|m| !m.is_empty())
    }
}
