//! In-memory audio source registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use voicecache_core::{AudioPayload, AudioSourceId, AudioSourceRegistry, SpeechResult};

/// Registry keeping live sources in a map of id to byte count.
///
/// Revoking an unknown or already revoked id is a logged no-op.
#[derive(Debug, Default)]
pub struct LocalAudioRegistry {
    next_id: AtomicU64,
    live: Mutex<HashMap<AudioSourceId, usize>>,
}

impl LocalAudioRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes held by live sources.
    pub fn live_bytes(&self) -> usize {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Whether `id` is registered and not yet revoked.
    pub fn is_live(&self, id: AudioSourceId) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }
}

impl AudioSourceRegistry for LocalAudioRegistry {
    fn register(&self, payload: &AudioPayload) -> SpeechResult<AudioSourceId> {
        let id = AudioSourceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.insert(id, payload.len());
        tracing::debug!(%id, bytes = payload.len(), live = live.len(), "Audio source registered");
        Ok(id)
    }

    fn revoke(&self, id: AudioSourceId) {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if live.remove(&id).is_some() {
            tracing::debug!(%id, live = live.len(), "Audio source revoked");
        } else {
            tracing::debug!(%id, "Ignoring revoke of unknown audio source");
        }
    }

    fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
