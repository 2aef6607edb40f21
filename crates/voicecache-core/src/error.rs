//! Speech error types.
//!
//! These errors are designed to be serializable and comparable so they can be
//! stored in cache snapshots and shipped to a presentation layer unchanged.
//! Transport errors from the HTTP stack are captured as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to the user when decoded audio fails to play.
pub const PLAYBACK_FAILED_MESSAGE: &str = "Playback failed";

/// Error type for synthesis, caching and playback operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechError {
    /// Network failure or unreachable endpoint.
    #[error("TTS request failed: {message}")]
    Transport {
        /// Detailed error message from the HTTP client.
        message: String,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("TTS failed: {status} {status_text} {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status (may be empty).
        status_text: String,
        /// Diagnostic body text returned by the endpoint.
        body: String,
    },

    /// Blank text was submitted.
    ///
    /// Raised locally before any request is made, so the status line reads
    /// `Text is empty` rather than the endpoint's 400 response.
    #[error("Text is empty")]
    EmptyText,

    /// The request was superseded or the owner was torn down.
    #[error("Request cancelled")]
    Cancelled,

    /// The audio payload failed to play.
    #[error("Playback failed: {message}")]
    Playback {
        /// Detailed error message from the player.
        message: String,
    },
}

impl SpeechError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a remote (non-2xx) error.
    pub fn remote(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Remote {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Create a playback error.
    pub fn playback(message: impl Into<String>) -> Self {
        Self::Playback {
            message: message.into(),
        }
    }

    /// Check if this is a cancellation.
    ///
    /// Cancellations are bookkeeping only and never reach the user.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status code, if the endpoint produced one.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert to the message shown in the status line.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Playback { .. } => PLAYBACK_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Convenience result type for speech operations.
pub type SpeechResult<T> = Result<T, SpeechError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_matches_wire_format() {
        let err = SpeechError::remote(503, "Service Unavailable", "overloaded");
        assert_eq!(
            err.user_message(),
            "TTS failed: 503 Service Unavailable overloaded"
        );
        assert_eq!(err.status_code(), Some(503));
    }

    #[test]
    fn playback_error_has_fixed_user_message() {
        let err = SpeechError::playback("decoder rejected frame");
        assert_eq!(err.user_message(), "Playback failed");
        assert!(err.to_string().contains("decoder rejected frame"));
    }

    #[test]
    fn cancellation_kinds() {
        assert!(SpeechError::Cancelled.is_cancelled());
        assert!(!SpeechError::transport("reset").is_cancelled());
        assert!(!SpeechError::EmptyText.is_cancelled());
    }

    #[test]
    fn error_serialization() {
        let err = SpeechError::remote(500, "Internal Server Error", "boom");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"remote\""));
        assert!(json.contains("500"));

        let parsed: SpeechError = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, err);
    }
}
