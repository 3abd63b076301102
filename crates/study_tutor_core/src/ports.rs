//! crates/study_tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP transports
//! or local storage.

use async_trait::async_trait;

use crate::domain::{SessionToken, TutorReply, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP
/// transport, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The request could not be sent or the connection failed.
    #[error("Network failure: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status.
    #[error("Backend returned error status {0}")]
    Protocol(u16),
    /// The local persistence layer is inaccessible.
    #[error("Local storage unavailable: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TutorBackendService: Send + Sync {
    /// Performs one exchange with the tutoring backend.
    ///
    /// Passing `None` for `session` asks the backend to start a new
    /// conversation; a token the backend assigns in response is propagated
    /// back to the caller through [`TutorReply::session`].
    async fn send_message(
        &self,
        text: &str,
        session: Option<&SessionToken>,
    ) -> PortResult<TutorReply>;

    /// Probes backend reachability. Never errors: any transport or status
    /// failure is reported as `false`.
    async fn check_health(&self) -> bool;
}

/// Local key-value cache for the last-known user profile and theme
/// preference. Absent or corrupt stored data loads as `None` - startup must
/// not fail on it.
#[async_trait]
pub trait ProfileStoreService: Send + Sync {
    async fn load_profile(&self) -> PortResult<Option<User>>;
    async fn save_profile(&self, user: &User) -> PortResult<()>;
    async fn clear_profile(&self) -> PortResult<()>;

    async fn load_theme(&self) -> PortResult<Option<String>>;
    async fn save_theme(&self, theme: &str) -> PortResult<()>;
}

/// Optional speech output capability. Environments without speech inject a
/// no-op implementation; the application must function with it absent.
#[async_trait]
pub trait SpeechSynthesisService: Send + Sync {
    /// Speaks a string of text aloud.
    async fn speak(&self, text: &str) -> PortResult<()>;
}

/// Optional speech input capability.
#[async_trait]
pub trait SpeechRecognitionService: Send + Sync {
    /// Captures one utterance, returning its transcript, or `None` when
    /// nothing was captured.
    async fn transcribe(&self) -> PortResult<Option<String>>;
}
