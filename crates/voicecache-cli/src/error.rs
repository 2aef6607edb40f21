//! CLI-specific error types and mappings.

use thiserror::Error;
use voicecache_core::SpeechError;
use voicecache_http::HttpClientError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (stdin closed, output directory not writable).
    #[error("IO error: {0}")]
    Io(String),

    /// Synthesis or playback failed.
    #[error("{0}")]
    Speech(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Follows sysexits.h where a category fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            Self::Io(_) => 74,     // EX_IOERR
            Self::Speech(_) => 69, // EX_UNAVAILABLE
        }
    }
}

impl From<HttpClientError> for CliError {
    fn from(err: HttpClientError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SpeechError> for CliError {
    fn from(err: SpeechError) -> Self {
        Self::Speech(err.user_message())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Config(String::new()).exit_code(), 78);
        assert_eq!(CliError::Io(String::new()).exit_code(), 74);
        assert_eq!(CliError::Speech(String::new()).exit_code(), 69);
    }

    #[test]
    fn test_speech_error_uses_user_message() {
        let err: CliError = SpeechError::remote(503, "Service Unavailable", "overloaded").into();
        assert_eq!(
            err.to_string(),
            "TTS failed: 503 Service Unavailable overloaded"
        );

        let err: CliError = SpeechError::playback("no device").into();
        assert_eq!(err.to_string(), "Playback failed");
    }
}
