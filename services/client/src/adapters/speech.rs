//! services/client/src/adapters/speech.rs
//!
//! No-op implementations of the optional speech capability ports, for
//! environments without speech hardware or browser APIs.

use async_trait::async_trait;
use study_tutor_core::ports::{
    PortResult, SpeechRecognitionService, SpeechSynthesisService,
};

/// A speech adapter that does nothing. Injected wherever speech is absent;
/// the controller behaves identically with or without it.
#[derive(Clone, Default)]
pub struct NoopSpeech;

#[async_trait]
impl SpeechSynthesisService for NoopSpeech {
    async fn speak(&self, _text: &str) -> PortResult<()> {
        Ok(())
    }
}

#[async_trait]
impl SpeechRecognitionService for NoopSpeech {
    async fn transcribe(&self) -> PortResult<Option<String>> {
        Ok(None)
    }
}
