//! Public configuration for the synthesis client.

use std::time::Duration;

/// Default endpoint: the `/tts` route of a locally running synthesis service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/tts";

/// Configuration for [`HttpSynthesisClient`](crate::HttpSynthesisClient).
///
/// # Example
///
/// ```
/// use voicecache_http::SynthesisClientConfig;
/// use std::time::Duration;
///
/// let config = SynthesisClientConfig::new()
///     .with_endpoint("https://tts.example.com/tts")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct SynthesisClientConfig {
    /// Synthesis endpoint receiving the POST
    pub(crate) endpoint: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Whole-request timeout
    pub(crate) timeout: Duration,
}

impl Default for SynthesisClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("voicecache-http/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SynthesisClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the synthesis endpoint.
    ///
    /// Defaults to `http://localhost:8000/tts`.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
