//! services/client/src/adapters/backend.rs
//!
//! This module contains the adapter for the remote tutoring backend.
//! It implements the `TutorBackendService` port from the `core` crate over
//! plain HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use study_tutor_core::domain::{SessionToken, TutorReply};
use study_tutor_core::ports::{PortError, PortResult, TutorBackendService};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TutorBackendService` against the tutoring
/// backend's HTTP API.
#[derive(Clone)]
pub struct HttpTutorBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTutorBackend {
    /// Creates a new `HttpTutorBackend`.
    ///
    /// The per-request timeout is fixed on the shared client here; there is
    /// no retry on top of it.
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponseRecord {
    response: String,
    session_id: Option<String>,
    phase: Option<String>,
}

impl ChatResponseRecord {
    fn to_domain(self) -> TutorReply {
        TutorReply {
            message: self.response,
            session: self.session_id.map(SessionToken),
            phase: self.phase,
        }
    }
}

//=========================================================================================
// `TutorBackendService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TutorBackendService for HttpTutorBackend {
    /// Performs one request/response exchange with the backend's chat
    /// endpoint. A `None` session asks the backend for a fresh conversation.
    async fn send_message(
        &self,
        text: &str,
        session: Option<&SessionToken>,
    ) -> PortResult<TutorReply> {
        let url = format!("{}/chat", self.base_url);
        let body = ChatRequest {
            message: text,
            session_id: session.map(SessionToken::as_str),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Protocol(status.as_u16()));
        }

        let record: ChatResponseRecord = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }

    /// Probes the backend's health endpoint. Any transport failure or
    /// non-2xx status is reported as unreachable rather than an error.
    async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Health probe failed: {}", e);
                false
            }
        }
    }
}
