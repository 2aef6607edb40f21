//! Mutable coordinator state guarded by the coordinator's mutex.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use voicecache_core::{
    AudioPayload, AudioSource, AudioSourceRegistry, CacheEntrySnapshot, CacheStatus,
    CoordinatorSnapshot, FetchOrigin, SpeakStatus, SpeechError, SpeechResult, VoiceKey,
};

use crate::lease::LeaseId;

/// The single in-flight fetch for a key.
#[derive(Debug)]
pub(super) struct PendingFetch {
    pub(super) lease: LeaseId,
    pub(super) cancel: CancellationToken,
}

/// Cache entry for one voice.
///
/// `source` is `Some` exactly when `status` is `Ready`.
#[derive(Debug, Default)]
pub(super) struct CacheSlot {
    pub(super) status: CacheStatus,
    pub(super) source: Option<AudioSource>,
    pub(super) error: Option<String>,
    pub(super) origin: Option<FetchOrigin>,
    pub(super) pending: Option<PendingFetch>,
}

impl CacheSlot {
    /// Cancel the current fetch (if any) and register a new one.
    pub(super) fn begin_fetch(
        &mut self,
        lease: LeaseId,
        origin: FetchOrigin,
    ) -> CancellationToken {
        if let Some(previous) = self.pending.take() {
            previous.cancel.cancel();
        }
        let cancel = CancellationToken::new();
        self.pending = Some(PendingFetch {
            lease,
            cancel: cancel.clone(),
        });
        self.status = CacheStatus::Loading;
        self.error = None;
        self.origin = Some(origin);
        cancel
    }

    /// A `speak` is fetching this key right now.
    pub(super) fn is_fetching_on_demand(&self) -> bool {
        self.pending.is_some() && self.origin == Some(FetchOrigin::OnDemand)
    }

    fn holds_lease(&self, lease: LeaseId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.lease == lease)
    }

    /// Drop cached audio and any pending fetch.
    pub(super) fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
        }
        if let Some(source) = self.source.take() {
            source.release();
        }
        self.status = CacheStatus::Idle;
        self.error = None;
    }

    fn snapshot(&self) -> CacheEntrySnapshot {
        CacheEntrySnapshot {
            status: self.status,
            has_audio: self.source.is_some(),
            error_detail: self.error.clone(),
            origin: self.origin,
        }
    }
}

/// How a fetch completion was applied to the cache.
#[derive(Debug)]
pub(super) enum Settled {
    /// Stored as `Ready`.
    Ready(AudioSource),
    /// Stored as `Failed`.
    Failed(SpeechError),
    /// Cancelled while still current; entry back to `Idle`.
    Cancelled,
    /// Lease no longer current; nothing was written.
    Stale,
}

/// On-demand fetch started by the current `speak`.
#[derive(Debug)]
pub(super) struct OnDemandFetch {
    pub(super) key: VoiceKey,
    pub(super) cancel: CancellationToken,
}

/// The one playback that may report completion.
#[derive(Debug)]
pub(super) struct PlaybackSlot {
    pub(super) lease: LeaseId,
    pub(super) stop: CancellationToken,
}

#[derive(Debug, Default)]
pub(super) struct CoordinatorState {
    pub(super) entries: IndexMap<VoiceKey, CacheSlot>,
    pub(super) speak: SpeakStatus,
    /// Lease of the most recent `speak`; older calls are superseded.
    pub(super) speak_lease: Option<LeaseId>,
    pub(super) on_demand: Option<OnDemandFetch>,
    pub(super) playback: Option<PlaybackSlot>,
    pub(super) closed: bool,
}

impl CoordinatorState {
    pub(super) fn is_current_speak(&self, lease: LeaseId) -> bool {
        !self.closed && self.speak_lease == Some(lease)
    }

    /// Stop the active playback and cancel the active on-demand fetch.
    pub(super) fn interrupt_speak(&mut self) {
        if let Some(playback) = self.playback.take() {
            tracing::debug!(lease = %playback.lease, "Stopping previous playback");
            playback.stop.cancel();
        }
        if let Some(fetch) = self.on_demand.take() {
            tracing::debug!(key = %fetch.key, "Cancelling previous on-demand fetch");
            fetch.cancel.cancel();
        }
    }

    /// Apply a fetch result for `key` if `lease` is still the key's pending lease.
    ///
    /// The payload is registered as an audio source only after the lease
    /// check passes.
    pub(super) fn settle_fetch(
        &mut self,
        registry: &Arc<dyn AudioSourceRegistry>,
        key: &VoiceKey,
        lease: LeaseId,
        result: SpeechResult<AudioPayload>,
    ) -> Settled {
        if self.closed {
            return Settled::Stale;
        }
        let Some(slot) = self.entries.get_mut(key) else {
            return Settled::Stale;
        };
        if !slot.holds_lease(lease) {
            tracing::debug!(%key, %lease, "Ignoring stale fetch completion (lease mismatch)");
            return Settled::Stale;
        }
        slot.pending = None;

        let result = result.and_then(|payload| AudioSource::acquire(Arc::clone(registry), payload));
        match result {
            Ok(source) => {
                if let Some(previous) = slot.source.replace(source.clone()) {
                    previous.release();
                }
                slot.status = CacheStatus::Ready;
                slot.error = None;
                tracing::debug!(%key, id = %source.id(), "Voice audio cached");
                Settled::Ready(source)
            }
            Err(e) if e.is_cancelled() => {
                slot.status = CacheStatus::Idle;
                slot.error = None;
                tracing::debug!(%key, "Fetch cancelled");
                Settled::Cancelled
            }
            Err(e) => {
                if let Some(previous) = slot.source.take() {
                    previous.release();
                }
                slot.status = CacheStatus::Failed;
                slot.error = Some(e.user_message());
                tracing::warn!(%key, error = %e, "Fetch failed");
                Settled::Failed(e)
            }
        }
    }

    /// Release every source, cancel all work and mark the state closed.
    pub(super) fn close(&mut self) {
        self.interrupt_speak();
        for slot in self.entries.values_mut() {
            slot.reset();
        }
        self.speak_lease = None;
        self.speak.busy = false;
        self.closed = true;
    }

    pub(super) fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            entries: self
                .entries
                .iter()
                .map(|(key, slot)| (key.clone(), slot.snapshot()))
                .collect(),
            speak: self.speak.clone(),
        }
    }
}
