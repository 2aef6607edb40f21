//! reqwest implementation of [`SynthesisPort`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use voicecache_core::{
    AudioPayload, CancellationToken, SpeechError, SpeechResult, SynthesisPort, SynthesisRequest,
};

use crate::config::SynthesisClientConfig;
use crate::error::HttpClientError;

/// Synthesis client that POSTs JSON to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpSynthesisClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSynthesisClient {
    /// Build a client from configuration.
    pub fn new(config: SynthesisClientConfig) -> Result<Self, HttpClientError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| HttpClientError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(HttpClientError::UnsupportedScheme {
                scheme: endpoint.scheme().to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// The endpoint requests are sent to.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one request and read the full body.
    async fn fetch(&self, request: &SynthesisRequest) -> SpeechResult<AudioPayload> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| SpeechError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Body is diagnostic only; an unreadable body still yields the status
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::remote(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body,
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::transport(e.to_string()))?;

        Ok(AudioPayload {
            bytes,
            content_type,
        })
    }
}

#[async_trait]
impl SynthesisPort for HttpSynthesisClient {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> SpeechResult<AudioPayload> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(SpeechError::Cancelled);
        }

        tracing::debug!(lang = %request.lang, chars = request.text.chars().count(), "Synthesis request");

        let result = tokio::select! {
            biased;

            () = cancel.cancelled() => Err(SpeechError::Cancelled),

            result = self.fetch(request) => result,
        };

        match &result {
            Ok(payload) => {
                tracing::debug!(lang = %request.lang, bytes = payload.len(), "Synthesis complete");
            }
            Err(e) if e.is_cancelled() => {
                tracing::debug!(lang = %request.lang, "Synthesis request cancelled");
            }
            Err(e) => {
                tracing::warn!(lang = %request.lang, error = %e, "Synthesis request failed");
            }
        }

        result
    }
}
