//! Audio payloads and playable source handles.
//!
//! An [`AudioSource`] is the explicit counterpart of a browser object URL:
//! it is minted by an [`AudioSourceRegistry`] from a fetched payload and must
//! be released exactly once. Clones share a single release flag, so the cache
//! and the active playback session can hold the same source while only one of
//! them actually revokes it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ports::AudioSourceRegistry;

/// Raw audio returned by the synthesis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    /// Encoded audio bytes (typically `audio/mpeg`).
    pub bytes: Bytes,
    /// Content type reported by the endpoint, if any.
    pub content_type: Option<String>,
}

impl AudioPayload {
    /// Create a payload without a content type.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Attach a content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Identifier handed out by an [`AudioSourceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AudioSourceId(pub u64);

impl fmt::Display for AudioSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "audio-source-{}", self.0)
    }
}

/// A registered, ready-to-play audio payload.
#[derive(Clone)]
pub struct AudioSource {
    id: AudioSourceId,
    bytes: Bytes,
    content_type: Option<String>,
    registry: Arc<dyn AudioSourceRegistry>,
    released: Arc<AtomicBool>,
}

impl AudioSource {
    /// Register `payload` with `registry` and wrap the resulting id.
    pub fn acquire(
        registry: Arc<dyn AudioSourceRegistry>,
        payload: AudioPayload,
    ) -> crate::SpeechResult<Self> {
        let id = registry.register(&payload)?;
        Ok(Self {
            id,
            bytes: payload.bytes,
            content_type: payload.content_type,
            registry,
            released: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Registry id of this source.
    pub const fn id(&self) -> AudioSourceId {
        self.id
    }

    /// Encoded audio bytes (cheap clone).
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Content type reported when the payload was fetched.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Release the underlying registry entry.
    ///
    /// Returns `true` only for the call that actually revoked the entry;
    /// later calls (from this handle or any clone) are no-ops.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.registry.revoke(self.id);
        tracing::trace!(id = %self.id, "Audio source released");
        true
    }

    /// Whether [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSource")
            .field("id", &self.id)
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
