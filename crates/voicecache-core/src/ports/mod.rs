//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the coordinator expects from its
//! collaborators: the remote synthesis endpoint, the resource registry that
//! backs audio sources, and the host's playback primitive.
//!
//! # Design Rules
//!
//! - No `reqwest` or `rodio` types in any signature
//! - Every long-running call takes a `CancellationToken`
//! - Cancellation resolves as `SpeechError::Cancelled` (fetch) or `Ok(())` (playback)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::audio::{AudioPayload, AudioSource, AudioSourceId};
use crate::domain::VoiceKey;
use crate::error::{SpeechError, SpeechResult};

/// JSON body sent to the synthesis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to synthesize.
    pub text: String,
    /// Voice key, sent as `lang`.
    pub lang: VoiceKey,
}

impl SynthesisRequest {
    /// Create a new request.
    pub fn new(lang: impl Into<VoiceKey>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
        }
    }

    /// Reject blank text before it reaches the network.
    pub fn validate(&self) -> SpeechResult<()> {
        if self.text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        Ok(())
    }
}

/// Remote text-to-speech endpoint.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// Fetch synthesized audio for `request`.
    ///
    /// Implementations must return `SpeechError::Cancelled` promptly once
    /// `cancel` fires.
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> SpeechResult<AudioPayload>;
}

/// Registry that turns payloads into revocable playable sources.
///
/// This is the explicit `acquire`/`release` pair standing in for object URLs.
pub trait AudioSourceRegistry: Send + Sync {
    /// Register a payload and hand out its id.
    fn register(&self, payload: &AudioPayload) -> SpeechResult<AudioSourceId>;

    /// Revoke a previously registered id.
    fn revoke(&self, id: AudioSourceId);

    /// Number of ids registered and not yet revoked.
    fn live_count(&self) -> usize;
}

/// Host playback primitive.
#[async_trait]
pub trait AudioPlayerPort: Send + Sync {
    /// Play `source` to the end.
    ///
    /// Resolves on natural end, on a playback error, or promptly with
    /// `Ok(())` after `stop` is cancelled.
    async fn play(&self, source: AudioSource, stop: CancellationToken) -> SpeechResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_wire_body() {
        let request = SynthesisRequest::new("ar-EG-ShakirNeural", "مرحبا");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "text": "مرحبا", "lang": "ar-EG-ShakirNeural" })
        );
    }

    #[test]
    fn blank_text_fails_validation() {
        assert_eq!(
            SynthesisRequest::new("en", "  \n").validate(),
            Err(SpeechError::EmptyText)
        );
        assert!(SynthesisRequest::new("en", "hi").validate().is_ok());
    }

    #[tokio::test]
    async fn mock_port_returns_canned_payload() {
        let mut mock = MockSynthesisPort::new();
        mock.expect_synthesize()
            .withf(|req, _| req.lang.as_str() == "en")
            .times(1)
            .returning(|_, _| Ok(AudioPayload::new(vec![0u8; 8])));

        let payload = mock
            .synthesize(&SynthesisRequest::new("en", "hello"), &CancellationToken::new())
            .await;
        tokio_test::assert_ok!(&payload);
        assert_eq!(payload.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn mock_port_propagates_errors() {
        let mut mock = MockSynthesisPort::new();
        mock.expect_synthesize()
            .returning(|_, _| Err(SpeechError::remote(500, "Internal Server Error", "")));

        let result = mock
            .synthesize(&SynthesisRequest::new("fr", "bonjour"), &CancellationToken::new())
            .await;
        tokio_test::assert_err!(&result);
    }
}
