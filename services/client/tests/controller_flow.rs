//! Integration tests for the conversation controller, driven through mock
//! implementations of the core service ports.

use async_trait::async_trait;
use client_lib::session::{ConversationController, Theme};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use study_tutor_core::domain::{Role, SessionToken, TutorReply, User};
use study_tutor_core::ports::{
    PortError, PortResult, ProfileStoreService, TutorBackendService,
};
use study_tutor_core::subject::Subject;

//=========================================================================================
// Mock Ports
//=========================================================================================

/// A scripted tutoring backend: answers exchanges from a queue and records
/// every call it receives. An exhausted script fails like a dead network.
#[derive(Default)]
struct MockBackend {
    script: Mutex<VecDeque<PortResult<TutorReply>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    healthy: AtomicBool,
}

impl MockBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn enqueue(&self, result: PortResult<TutorReply>) {
        self.script.lock().unwrap().push_back(result);
    }

    fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

fn reply(message: &str, session: Option<&str>, phase: Option<&str>) -> PortResult<TutorReply> {
    Ok(TutorReply {
        message: message.to_string(),
        session: session.map(|s| SessionToken(s.to_string())),
        phase: phase.map(str::to_string),
    })
}

#[async_trait]
impl TutorBackendService for MockBackend {
    async fn send_message(
        &self,
        text: &str,
        session: Option<&SessionToken>,
    ) -> PortResult<TutorReply> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), session.map(|s| s.as_str().to_string())));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Network("script exhausted".to_string())))
    }

    async fn check_health(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// An in-memory profile cache.
#[derive(Default)]
struct MemoryProfileStore {
    user: Mutex<Option<User>>,
    theme: Mutex<Option<String>>,
}

#[async_trait]
impl ProfileStoreService for MemoryProfileStore {
    async fn load_profile(&self) -> PortResult<Option<User>> {
        Ok(self.user.lock().unwrap().clone())
    }
    async fn save_profile(&self, user: &User) -> PortResult<()> {
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(())
    }
    async fn clear_profile(&self) -> PortResult<()> {
        *self.user.lock().unwrap() = None;
        Ok(())
    }
    async fn load_theme(&self) -> PortResult<Option<String>> {
        Ok(self.theme.lock().unwrap().clone())
    }
    async fn save_theme(&self, theme: &str) -> PortResult<()> {
        *self.theme.lock().unwrap() = Some(theme.to_string());
        Ok(())
    }
}

fn controller(backend: Arc<MockBackend>) -> ConversationController {
    ConversationController::new(backend, Arc::new(MemoryProfileStore::default()))
}

//=========================================================================================
// Study Lifecycle
//=========================================================================================

#[tokio::test]
async fn quantum_physics_start_and_tutoring_exchange() {
    let backend = MockBackend::new();
    backend.enqueue(reply("Let's begin...", Some("s1"), Some("intro")));
    backend.enqueue(reply("Good!", None, Some("feynman_tutoring")));

    let mut controller = controller(backend.clone());
    let study_id = controller.start_new_study("Quantum Physics").await;

    let study = controller.active_study().unwrap();
    assert_eq!(study.subject, Subject::Physics);
    // The intro phase leaves progress untouched.
    assert_eq!(study.progress, 0);
    let messages = &controller.state().active_messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Ai);
    assert_eq!(messages[0].content, "Let's begin...");
    assert_eq!(
        controller.state().store.token(study_id).map(|t| t.as_str()),
        Some("s1")
    );

    controller.send_message("I think energy is quantized").await;

    let study = controller.active_study().unwrap();
    assert_eq!(study.progress, 10);
    assert_eq!(study.questions_answered, 1);
    let messages = &controller.state().active_messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].content, "Good!");

    // The opening exchange is tokenless; the follow-up reuses the backend's
    // token.
    let calls = backend.calls();
    assert_eq!(calls[0], ("I want to learn about Quantum Physics".to_string(), None));
    assert_eq!(
        calls[1],
        (
            "I think energy is quantized".to_string(),
            Some("s1".to_string())
        )
    );
}

#[tokio::test]
async fn switch_round_trip_reproduces_messages() {
    let backend = MockBackend::new();
    backend.enqueue(reply("Welcome to algebra", Some("a"), Some("intro")));
    backend.enqueue(reply("Welcome to history", Some("b"), Some("intro")));

    let mut controller = controller(backend);
    let study_a = controller.start_new_study("Algebra Basics").await;
    let before: Vec<_> = controller.state().active_messages.clone();

    let study_b = controller.start_new_study("The Roman Empire").await;
    assert_ne!(study_a, study_b);

    controller.switch_to(study_a).await;
    assert_eq!(controller.state().active_messages, before);

    controller.switch_to(study_b).await;
    controller.switch_to(study_a).await;
    assert_eq!(controller.state().active_messages, before);
}

#[tokio::test]
async fn fallback_history_counts_as_initialized_on_switch_back() {
    let backend = MockBackend::new();
    // Opening exchange for study A fails: no token, and the single fallback
    // message is the only history - which still marks A as initialized.
    backend.enqueue(Err(PortError::Network("connection refused".to_string())));
    backend.enqueue(reply("Welcome", Some("b"), None));

    let mut controller = controller(backend.clone());
    let study_a = controller.start_new_study("Volcano Formation").await;
    let study_b = controller.start_new_study("Cell Division").await;
    assert_ne!(study_a, study_b);

    // A has a cached fallback message, so switching back does not re-open.
    controller.switch_to(study_a).await;
    assert_eq!(backend.calls().len(), 2);
    assert_eq!(controller.state().active_messages.len(), 1);
}

#[tokio::test]
async fn directory_partitions_studies_newest_first() {
    let backend = MockBackend::new();
    for _ in 0..4 {
        backend.enqueue(reply("hello", None, None));
    }

    let mut controller = controller(backend);
    controller.start_new_study("Linear Algebra").await;
    controller.start_new_study("Quantum Mechanics").await;
    controller.start_new_study("Calculus II").await;
    controller.start_new_study("Thermodynamics").await;

    let groups = controller.state().directory.groups();
    assert_eq!(groups.len(), 2);
    // Physics was seen after Mathematics, so its group leads.
    assert_eq!(groups[0].subject, Subject::Physics);
    assert_eq!(groups[0].studies[0].title, "Thermodynamics");
    assert_eq!(groups[0].studies[1].title, "Quantum Mechanics");
    assert_eq!(groups[1].studies[0].title, "Calculus II");
    assert_eq!(groups[1].studies[1].title, "Linear Algebra");

    let total: usize = groups.iter().map(|g| g.studies.len()).sum();
    assert_eq!(total, 4);
}

//=========================================================================================
// Failure Paths
//=========================================================================================

#[tokio::test]
async fn failed_start_appends_fallback_and_records_no_token() {
    let backend = MockBackend::new();
    backend.set_healthy(false);
    backend.enqueue(Err(PortError::Network("connection refused".to_string())));

    let mut controller = controller(backend.clone());
    controller.startup().await;
    assert!(!controller.state().backend_reachable);

    let study_id = controller.start_new_study("Quantum Physics").await;

    let messages = &controller.state().active_messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Ai);
    assert!(messages[0]
        .content
        .starts_with("Great! Let's start learning about \"Quantum Physics\""));
    assert!(messages[0].content.contains("Can you begin by explaining"));
    assert!(controller.state().store.token(study_id).is_none());
}

#[tokio::test]
async fn failed_send_appends_exactly_one_fallback() {
    let backend = MockBackend::new();
    backend.set_healthy(true);
    backend.enqueue(reply("Welcome", Some("s1"), None));
    backend.enqueue(Err(PortError::Protocol(500)));

    let mut controller = controller(backend);
    controller.startup().await;
    controller.start_new_study("Organic Chemistry").await;
    let before = controller.state().active_messages.len();

    controller.send_message("What is a carbonyl group?").await;

    let messages = &controller.state().active_messages;
    // Exactly two new messages: the optimistic user message plus one
    // fallback.
    assert_eq!(messages.len(), before + 2);
    assert_eq!(messages[before].role, Role::User);
    assert_eq!(messages[before].content, "What is a carbonyl group?");
    assert_eq!(messages[before + 1].role, Role::Ai);
    assert!(messages[before + 1].content.contains("had trouble answering"));
}

#[tokio::test]
async fn offline_fallback_wording_differs_from_erroring() {
    let backend = MockBackend::new();
    backend.set_healthy(false);
    backend.enqueue(Err(PortError::Network("unreachable".to_string())));
    backend.enqueue(Err(PortError::Network("unreachable".to_string())));

    let mut controller = controller(backend);
    controller.startup().await;
    controller.start_new_study("Photosynthesis").await;
    controller.send_message("How do plants store energy?").await;

    let messages = &controller.state().active_messages;
    let fallback = &messages.last().unwrap().content;
    assert!(fallback.contains("looks offline"));
}

#[tokio::test]
async fn tokenless_send_after_failed_start_establishes_session() {
    let backend = MockBackend::new();
    backend.enqueue(Err(PortError::Network("down".to_string())));
    backend.enqueue(reply("Here we go", Some("fresh"), None));

    let mut controller = controller(backend.clone());
    let study_id = controller.start_new_study("Ancient Egypt").await;
    assert!(controller.state().store.token(study_id).is_none());

    controller.send_message("Tell me about the pyramids").await;

    // The send went out with no token and the newly assigned one stuck.
    let calls = backend.calls();
    assert_eq!(calls[1].1, None);
    assert_eq!(
        controller.state().store.token(study_id).map(|t| t.as_str()),
        Some("fresh")
    );
}

#[tokio::test]
async fn progress_saturates_and_never_decreases() {
    let backend = MockBackend::new();
    backend.enqueue(reply("Welcome", Some("s1"), None));
    for _ in 0..12 {
        backend.enqueue(reply("Good!", None, Some("feynman_tutoring")));
    }

    let mut controller = controller(backend);
    controller.start_new_study("Probability Theory").await;

    let mut last_progress = 0;
    for i in 0..12u32 {
        controller.send_message("another answer").await;
        let study = controller.active_study().unwrap();
        assert!(study.progress >= last_progress);
        assert!(study.progress <= 100);
        last_progress = study.progress;
        assert_eq!(study.questions_answered, i + 1);
    }
    assert_eq!(last_progress, 100);
}

//=========================================================================================
// Input Edge Cases, Auth and Theme
//=========================================================================================

#[tokio::test]
async fn blank_input_and_missing_study_are_no_ops() {
    let backend = MockBackend::new();
    let mut controller = controller(backend.clone());

    // No active study yet.
    controller.send_message("hello?").await;
    assert!(backend.calls().is_empty());

    backend.enqueue(reply("Welcome", Some("s1"), None));
    controller.start_new_study("Climate Systems").await;
    controller.send_message("   ").await;
    controller.send_message("").await;
    // Only the opening exchange went out.
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn login_logout_round_trip_preserves_theme() {
    let backend = MockBackend::new();
    let profile = Arc::new(MemoryProfileStore::default());
    let mut controller = ConversationController::new(backend, profile.clone());

    controller.login("Ada", "ada@example.com").await;
    assert!(controller.state().user.is_some());
    assert!(profile.user.lock().unwrap().is_some());

    controller.toggle_theme().await;
    assert_eq!(controller.state().theme, Theme::Dark);
    assert_eq!(profile.theme.lock().unwrap().as_deref(), Some("dark"));

    controller.logout().await;
    assert!(controller.state().user.is_none());
    assert!(profile.user.lock().unwrap().is_none());
    // Session state is torn down, the theme preference survives.
    assert!(controller.state().directory.groups().is_empty());
    assert_eq!(controller.state().theme, Theme::Dark);
}

#[tokio::test]
async fn startup_restores_cached_profile_and_theme() {
    let backend = MockBackend::new();
    backend.set_healthy(true);
    let profile = Arc::new(MemoryProfileStore::default());
    *profile.user.lock().unwrap() = Some(User::new("Grace", "grace@example.com"));
    *profile.theme.lock().unwrap() = Some("dark".to_string());

    let mut controller = ConversationController::new(backend, profile);
    controller.startup().await;

    assert_eq!(controller.state().user.as_ref().unwrap().name, "Grace");
    assert_eq!(controller.state().theme, Theme::Dark);
    assert!(controller.state().backend_reachable);
}

#[tokio::test]
async fn continuation_uses_the_continue_seed() {
    let backend = MockBackend::new();
    backend.enqueue(reply("Welcome back", Some("c1"), None));

    let mut controller = controller(backend.clone());
    // A study restored without ever completing an opening exchange.
    let study = study_tutor_core::domain::Study::new("Ocean Currents");
    let study_id = study.id;
    controller.restore_study(study);

    controller.switch_to(study_id).await;

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        (
            "I want to continue learning about Ocean Currents".to_string(),
            None
        )
    );
    assert_eq!(
        controller.state().store.token(study_id).map(|t| t.as_str()),
        Some("c1")
    );
    assert_eq!(controller.state().active_messages.len(), 1);
}
