//! Construction errors for the HTTP client.
//!
//! Request-time failures are reported as `SpeechError` through the port; these
//! errors only cover building the client.

use thiserror::Error;

/// Errors raised while building an [`HttpSynthesisClient`](crate::HttpSynthesisClient).
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The configured endpoint is not a valid absolute URL.
    #[error("Invalid synthesis endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// The rejected endpoint string
        endpoint: String,
        /// Parser error
        source: url::ParseError,
    },

    /// The endpoint uses a scheme other than http or https.
    #[error("Unsupported endpoint scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme {
        /// The rejected scheme
        scheme: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
