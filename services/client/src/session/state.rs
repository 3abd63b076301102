//! services/client/src/session/state.rs
//!
//! Defines the application's single owned state object and the per-study
//! lifecycle states derived from it.

use std::collections::HashSet;
use study_tutor_core::domain::{Message, Role, User};
use uuid::Uuid;

use crate::session::directory::StudyDirectory;
use crate::session::store::StudySessionStore;

//=========================================================================================
// Theme
//=========================================================================================

/// The UI color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Decodes the persisted preference string: "dark" means dark, anything
    /// else means light.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

//=========================================================================================
// Per-Study Lifecycle State
//=========================================================================================

/// The lifecycle state of one study, derived from the app state rather than
/// stored, so it can never drift from the underlying bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyState {
    /// No token, no messages: the first exchange never completed.
    Uninitialized,
    /// An exchange establishing the first token is in flight. Exclusive:
    /// gates re-entrant initialization for the same study.
    Initializing,
    /// The active study, ready to send and receive.
    Active,
    /// Not active, but its messages and token remain cached for a later
    /// switch back.
    Abandoned,
}

//=========================================================================================
// AppState (The Single Owned Application State)
//=========================================================================================

/// All mutable application state, owned in one place and passed explicitly
/// to the controller. Created at session start, torn down at logout.
#[derive(Debug, Default)]
pub struct AppState {
    pub user: Option<User>,
    pub theme: Theme,
    pub directory: StudyDirectory,
    pub store: StudySessionStore,
    /// The currently active study, if any. Exactly one study is active at a
    /// time, or none.
    pub active_study: Option<Uuid>,
    /// Message buffer for the active study, flushed into the store before
    /// every switch.
    pub active_messages: Vec<Message>,
    /// The user's in-progress input line.
    pub draft: String,
    /// Last known backend reachability, refreshed by health probes and
    /// successful exchanges.
    pub backend_reachable: bool,
    /// Studies with an exchange currently in flight. Gates double-submits
    /// and concurrent initialization.
    pub busy: HashSet<Uuid>,
    next_message_id: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a message with the next monotonic id.
    pub fn new_message(&mut self, role: Role, content: impl Into<String>) -> Message {
        self.next_message_id += 1;
        Message {
            id: self.next_message_id,
            role,
            content: content.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Allocates a message and appends it to the active buffer.
    pub fn push_message(&mut self, role: Role, content: impl Into<String>) {
        let message = self.new_message(role, content);
        self.active_messages.push(message);
    }

    /// Derives the lifecycle state of a study.
    pub fn study_state(&self, study_id: Uuid) -> StudyState {
        if self.busy.contains(&study_id) && !self.store.is_initialized(study_id) {
            return StudyState::Initializing;
        }
        if self.active_study == Some(study_id) {
            return StudyState::Active;
        }
        if self.store.is_initialized(study_id) {
            StudyState::Abandoned
        } else {
            StudyState::Uninitialized
        }
    }
}
