//! services/client/src/session/controller.rs
//!
//! The conversation controller: orchestrates the session store, the study
//! directory and the backend port to implement starting, switching and
//! chatting within studies.

use std::sync::Arc;
use study_tutor_core::domain::{Role, Study, User};
use study_tutor_core::ports::{
    ProfileStoreService, SpeechRecognitionService, SpeechSynthesisService,
    TutorBackendService,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::session::state::{AppState, StudyState, Theme};

/// Fallback shown when the exchange that opens a study fails. The study
/// still counts as started and no token is recorded, so the next message
/// implicitly retries establishing a backend session.
fn start_fallback(title: &str) -> String {
    format!(
        "Great! Let's start learning about \"{title}\"! I couldn't reach the \
         tutoring service just now, so we'll work on our own for the moment. \
         Can you begin by explaining what you already know about this topic?"
    )
}

/// Fallback for a failed send while the backend was last known reachable.
const SEND_FALLBACK_ERRORING: &str =
    "The tutoring service had trouble answering that one. Your message is \
     kept above - please try sending it again in a moment.";

/// Fallback for a failed send while the backend was last believed offline.
const SEND_FALLBACK_OFFLINE: &str =
    "The tutoring service looks offline right now. Your message is kept \
     above - once the connection is back, just send another message to \
     continue.";

//=========================================================================================
// The Controller
//=========================================================================================

/// Owns the application state and the service ports, and drives every user
/// action. Single-threaded and event-driven: each action performs at most
/// one backend exchange, gated per study against re-entrant submission.
pub struct ConversationController {
    state: AppState,
    backend: Arc<dyn TutorBackendService>,
    profile: Arc<dyn ProfileStoreService>,
    speech_out: Option<Arc<dyn SpeechSynthesisService>>,
    speech_in: Option<Arc<dyn SpeechRecognitionService>>,
}

impl ConversationController {
    pub fn new(
        backend: Arc<dyn TutorBackendService>,
        profile: Arc<dyn ProfileStoreService>,
    ) -> Self {
        Self {
            state: AppState::new(),
            backend,
            profile,
            speech_out: None,
            speech_in: None,
        }
    }

    /// Injects the optional speech capabilities. The controller behaves
    /// identically when they are absent.
    pub fn with_speech(
        mut self,
        synthesis: Arc<dyn SpeechSynthesisService>,
        recognition: Arc<dyn SpeechRecognitionService>,
    ) -> Self {
        self.speech_out = Some(synthesis);
        self.speech_in = Some(recognition);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The currently active study, if any.
    pub fn active_study(&self) -> Option<&Study> {
        self.state
            .active_study
            .and_then(|id| self.state.directory.study(id))
    }

    //=====================================================================================
    // Startup, Auth and Theme
    //=====================================================================================

    /// Restores cached profile and theme, then probes backend health.
    /// Missing or corrupt cached state simply means starting fresh.
    pub async fn startup(&mut self) {
        match self.profile.load_profile().await {
            Ok(user) => self.state.user = user,
            Err(e) => warn!("Could not load cached profile: {}", e),
        }
        match self.profile.load_theme().await {
            Ok(Some(theme)) => self.state.theme = Theme::from_stored(&theme),
            Ok(None) => {}
            Err(e) => warn!("Could not load cached theme: {}", e),
        }
        self.state.backend_reachable = self.backend.check_health().await;
        info!(
            "Startup complete. Backend reachable: {}",
            self.state.backend_reachable
        );
    }

    /// Logs a user in, caching the profile locally. A storage failure is
    /// logged and the login proceeds in-memory.
    pub async fn login(&mut self, name: &str, email: &str) {
        let user = User::new(name, email);
        if let Err(e) = self.profile.save_profile(&user).await {
            warn!("Could not cache profile: {}", e);
        }
        info!("User '{}' logged in.", user.name);
        self.state.user = Some(user);
    }

    /// Logs out and tears down the session state. The theme preference
    /// survives; studies and conversations do not.
    pub async fn logout(&mut self) {
        if let Err(e) = self.profile.clear_profile().await {
            warn!("Could not clear cached profile: {}", e);
        }
        let theme = self.state.theme;
        self.state = AppState::new();
        self.state.theme = theme;
        info!("User logged out; session state torn down.");
    }

    /// Flips the theme and persists the preference.
    pub async fn toggle_theme(&mut self) {
        self.state.theme = self.state.theme.toggled();
        if let Err(e) = self.profile.save_theme(self.state.theme.as_str()).await {
            warn!("Could not persist theme preference: {}", e);
        }
    }

    /// Re-probes backend reachability on demand.
    pub async fn probe_health(&mut self) -> bool {
        self.state.backend_reachable = self.backend.check_health().await;
        self.state.backend_reachable
    }

    //=====================================================================================
    // Study Lifecycle
    //=====================================================================================

    /// Starts a new study for the given topic title and performs the
    /// opening exchange with the backend. Returns the new study's id.
    pub async fn start_new_study(&mut self, title: &str) -> Uuid {
        let study = Study::new(title);
        let study_id = study.id;
        let title = study.title.clone();
        info!("Starting study '{}' ({})", title, study.subject);

        self.flush_active();
        self.state.directory.insert(study);
        self.state.active_study = Some(study_id);
        self.state.active_messages = Vec::new();

        let seed = format!("I want to learn about {title}");
        self.establish_session(study_id, &title, &seed).await;
        study_id
    }

    /// Places a study into the directory without activating it or opening a
    /// backend session, as when restoring a directory from elsewhere. A
    /// later switch to it triggers session continuation.
    pub fn restore_study(&mut self, study: Study) {
        self.state.directory.insert(study);
    }

    /// Switches the active study, flushing the current buffer first and
    /// loading the target's cached history. A target that was never
    /// initialized gets its session (re-)established.
    pub async fn switch_to(&mut self, study_id: Uuid) {
        if self.state.active_study == Some(study_id) {
            return;
        }
        let Some(study) = self.state.directory.study(study_id) else {
            warn!("Ignoring switch to unknown study {}", study_id);
            return;
        };
        let title = study.title.clone();
        info!("Switching to study '{}'", title);
        let needs_session = self.state.study_state(study_id) == StudyState::Uninitialized;

        self.flush_active();
        self.state.active_study = Some(study_id);
        self.state.active_messages = self.state.store.messages(study_id).to_vec();

        if needs_session {
            self.continue_study_session(study_id, &title).await;
        }
    }

    /// Re-establishes a backend session for a study restored without one,
    /// using the continuation seed. Guarded so it never runs twice
    /// concurrently for the same study.
    async fn continue_study_session(&mut self, study_id: Uuid, title: &str) {
        if self.state.busy.contains(&study_id) {
            info!("Initialization already in flight for '{}'", title);
            return;
        }
        let seed = format!("I want to continue learning about {title}");
        self.establish_session(study_id, title, &seed).await;
    }

    /// The forced-new-session exchange shared by study start and
    /// continuation: no token is sent, and the backend-assigned one is
    /// recorded on success. On failure the study proceeds tokenless with a
    /// deterministic fallback message.
    async fn establish_session(&mut self, study_id: Uuid, title: &str, seed: &str) {
        self.state.busy.insert(study_id);
        let result = self.backend.send_message(seed, None).await;
        self.state.busy.remove(&study_id);

        match result {
            Ok(reply) => {
                if let Some(token) = reply.session {
                    self.state.store.set_token(study_id, token);
                }
                self.state.backend_reachable = true;
                self.append_message(study_id, Role::Ai, reply.message.clone());
                self.speak(&reply.message).await;
            }
            Err(e) => {
                error!("Opening exchange for '{}' failed: {}", title, e);
                self.append_message(study_id, Role::Ai, start_fallback(title));
            }
        }
    }

    //=====================================================================================
    // Messaging
    //=====================================================================================

    /// Sends a user message within the active study.
    ///
    /// The user message is appended optimistically before the exchange; on
    /// failure it stays, joined by exactly one fallback reply. A study with
    /// an exchange already in flight ignores further submissions.
    pub async fn send_message(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(study_id) = self.state.active_study else {
            return;
        };
        if self.state.busy.contains(&study_id) {
            info!("Exchange already in flight; ignoring submit.");
            return;
        }

        self.state.push_message(Role::User, text);
        self.state.draft.clear();

        let token = self.state.store.token(study_id).cloned();
        self.state.busy.insert(study_id);
        let result = self.backend.send_message(text, token.as_ref()).await;
        self.state.busy.remove(&study_id);

        match result {
            Ok(reply) => {
                self.state.backend_reachable = true;
                if let Some(ref session) = reply.session {
                    // Either the implicit retry of a failed opening exchange,
                    // or the backend forcing a new session mid-study.
                    self.state.store.set_token(study_id, session.clone());
                }
                if reply.is_tutoring_phase() {
                    if let Some(study) = self.state.directory.study_mut(study_id) {
                        study.record_tutoring_exchange();
                    }
                }
                self.append_message(study_id, Role::Ai, reply.message.clone());
                self.speak(&reply.message).await;
            }
            Err(e) => {
                error!("Exchange failed: {}", e);
                let fallback = if self.state.backend_reachable {
                    SEND_FALLBACK_ERRORING
                } else {
                    SEND_FALLBACK_OFFLINE
                };
                self.append_message(study_id, Role::Ai, fallback);
            }
        }
    }

    /// Fills the draft from the speech recognition capability, when present.
    pub async fn dictate(&mut self) {
        let Some(recognizer) = self.speech_in.clone() else {
            return;
        };
        match recognizer.transcribe().await {
            Ok(Some(text)) => self.state.draft = text,
            Ok(None) => {}
            Err(e) => warn!("Speech capture failed: {}", e),
        }
    }

    //=====================================================================================
    // Internals
    //=====================================================================================

    /// Flushes the active study's buffer into the keyed store. Called
    /// before every active-study change so no messages are lost across
    /// switches.
    fn flush_active(&mut self) {
        if let Some(current) = self.state.active_study {
            let buffer = std::mem::take(&mut self.state.active_messages);
            self.state.store.set_messages(current, buffer);
        }
    }

    /// Appends a message to the right place: the live buffer for the active
    /// study, the keyed store otherwise.
    fn append_message(&mut self, study_id: Uuid, role: Role, content: impl Into<String>) {
        let message = self.state.new_message(role, content);
        if self.state.active_study == Some(study_id) {
            self.state.active_messages.push(message);
        } else {
            let mut cached = self.state.store.messages(study_id).to_vec();
            cached.push(message);
            self.state.store.set_messages(study_id, cached);
        }
    }

    /// Speaks a reply when a synthesis capability is present. Best-effort:
    /// failures are logged and never surfaced.
    async fn speak(&self, text: &str) {
        if let Some(synth) = &self.speech_out {
            if let Err(e) = synth.speak(text).await {
                warn!("Speech synthesis failed: {}", e);
            }
        }
    }
}
