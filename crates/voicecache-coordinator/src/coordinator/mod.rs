//! Prefetching voice-audio cache coordinator.
//!
//! # Concurrency Model
//!
//! - All cache, pending-fetch and playback mutations happen under one mutex
//! - The mutex is never held across a network request or playback
//! - Every fetch carries a per-key lease; every `speak` carries a global lease
//! - A completion whose lease is no longer current only does bookkeeping

mod state;

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use voicecache_core::error::PLAYBACK_FAILED_MESSAGE;
use voicecache_core::{
    AudioOrigin, AudioPayload, AudioPlayerPort, AudioSource, AudioSourceRegistry,
    CacheEntrySnapshot, CacheStatus, CoordinatorSnapshot, FetchOrigin, SpeakOutcome, SpeechError,
    SpeechResult, SynthesisPort, SynthesisRequest, VoiceCatalog, VoiceKey, VoicePrompt,
};

use crate::lease::{LeaseCounter, LeaseId};
use state::{CoordinatorState, OnDemandFetch, PlaybackSlot, Settled};

/// What `speak` has to do once the lock is released.
enum SpeakPlan {
    Done(SpeakOutcome),
    Fetch {
        lease: LeaseId,
        cancel: CancellationToken,
    },
}

/// Voice-audio cache coordinator.
///
/// Owns the per-voice cache, every pending request and the active playback
/// session. Observers read [`CoordinatorSnapshot`]s and change state only
/// through [`initialize`](Self::initialize), [`speak`](Self::speak) and
/// [`teardown`](Self::teardown).
pub struct VoiceCacheCoordinator {
    synth: Arc<dyn SynthesisPort>,
    registry: Arc<dyn AudioSourceRegistry>,
    player: Arc<dyn AudioPlayerPort>,
    state: Mutex<CoordinatorState>,
    leases: LeaseCounter,
    snapshot_tx: watch::Sender<CoordinatorSnapshot>,
}

impl VoiceCacheCoordinator {
    /// Create a coordinator with an empty cache.
    pub fn new(
        synth: Arc<dyn SynthesisPort>,
        registry: Arc<dyn AudioSourceRegistry>,
        player: Arc<dyn AudioPlayerPort>,
    ) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(CoordinatorSnapshot::default());
        Arc::new(Self {
            synth,
            registry,
            player,
            state: Mutex::new(CoordinatorState::default()),
            leases: LeaseCounter::default(),
            snapshot_tx,
        })
    }

    /// Start a prefetch for every prompt in `catalog`.
    ///
    /// Each key is set to `Loading` and fetched in its own task. Keys that
    /// are already `Ready`, or that a `speak` is fetching, are left alone; a
    /// key with a prefetch in flight has that prefetch superseded. Returns
    /// once every fetch has been spawned.
    pub async fn initialize(self: &Arc<Self>, catalog: &VoiceCatalog) {
        let mut jobs = Vec::with_capacity(catalog.len());
        {
            let mut state = self.state.lock().await;
            if state.closed {
                tracing::debug!("Ignoring initialize after teardown");
                return;
            }
            for prompt in catalog {
                let slot = state.entries.entry(prompt.key.clone()).or_default();
                if slot.status == CacheStatus::Ready || slot.is_fetching_on_demand() {
                    continue;
                }
                let lease = self.leases.mint();
                let cancel = slot.begin_fetch(lease, FetchOrigin::Prefetch);
                jobs.push((prompt.clone(), lease, cancel));
            }
            self.publish(&state);
        }

        tracing::info!(voices = jobs.len(), "Prefetching voice audio");
        for (prompt, lease, cancel) in jobs {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                this.run_prefetch(prompt, lease, cancel).await;
            });
        }
    }

    async fn run_prefetch(&self, prompt: VoicePrompt, lease: LeaseId, cancel: CancellationToken) {
        tracing::debug!(key = %prompt.key, %lease, "Prefetch started");
        let result = self.fetch(&prompt.key, &prompt.text, &cancel).await;

        let mut state = self.state.lock().await;
        let settled = state.settle_fetch(&self.registry, &prompt.key, lease, result);
        if !matches!(settled, Settled::Stale) {
            self.publish(&state);
        }
    }

    /// Play `text` in voice `key`.
    ///
    /// Stops the current playback and cancels the previous on-demand fetch
    /// first. A `Ready` entry plays without a request; anything else is
    /// fetched on demand, superseding a pending prefetch for the same key.
    /// `Playing` is returned as soon as playback starts; the busy flag in
    /// the snapshot clears when it ends.
    pub async fn speak(
        self: &Arc<Self>,
        key: impl Into<VoiceKey>,
        text: impl Into<String>,
    ) -> SpeakOutcome {
        let key = key.into();
        let text = text.into();
        let lease = self.leases.mint();

        let plan = {
            let mut state = self.state.lock().await;
            self.plan_speak(&mut state, lease, &key, &text)
        };
        let (fetch_lease, cancel) = match plan {
            SpeakPlan::Done(outcome) => return outcome,
            SpeakPlan::Fetch { lease, cancel } => (lease, cancel),
        };

        tracing::debug!(%key, lease = %fetch_lease, "On-demand fetch started");
        let result = self.fetch(&key, &text, &cancel).await;

        let mut state = self.state.lock().await;
        let settled = state.settle_fetch(&self.registry, &key, fetch_lease, result);

        if !state.is_current_speak(lease) {
            // Cache writes above still count; status belongs to the newer call
            if !matches!(settled, Settled::Stale) {
                self.publish(&state);
            }
            tracing::debug!(%key, "Speak superseded while fetching");
            return SpeakOutcome::Superseded { key };
        }
        state.on_demand = None;

        let outcome = match settled {
            Settled::Ready(source) => {
                self.start_playback(&mut state, lease, &key, source);
                SpeakOutcome::Playing {
                    key,
                    source: AudioOrigin::Fetched,
                }
            }
            Settled::Failed(e) => {
                let message = e.user_message();
                state.speak.busy = false;
                state.speak.error = Some(message.clone());
                SpeakOutcome::Failed { key, message }
            }
            Settled::Cancelled | Settled::Stale => {
                state.speak.busy = false;
                SpeakOutcome::Superseded { key }
            }
        };
        self.publish(&state);
        outcome
    }

    /// First half of `speak`, run under the lock.
    fn plan_speak(
        self: &Arc<Self>,
        state: &mut CoordinatorState,
        lease: LeaseId,
        key: &VoiceKey,
        text: &str,
    ) -> SpeakPlan {
        if state.closed {
            return SpeakPlan::Done(SpeakOutcome::Superseded { key: key.clone() });
        }

        state.interrupt_speak();
        state.speak_lease = Some(lease);
        state.speak.busy = true;
        state.speak.error = None;
        state.speak.selection = Some(VoicePrompt::new(key.clone(), text));

        if text.trim().is_empty() {
            let message = SpeechError::EmptyText.user_message();
            state.speak.busy = false;
            state.speak.error = Some(message.clone());
            self.publish(state);
            return SpeakPlan::Done(SpeakOutcome::Failed {
                key: key.clone(),
                message,
            });
        }

        let slot = state.entries.entry(key.clone()).or_default();
        if let (CacheStatus::Ready, Some(source)) = (slot.status, slot.source.clone()) {
            tracing::debug!(%key, "Serving from cache");
            self.start_playback(state, lease, key, source);
            self.publish(state);
            return SpeakPlan::Done(SpeakOutcome::Playing {
                key: key.clone(),
                source: AudioOrigin::Cached,
            });
        }

        let fetch_lease = self.leases.mint();
        let cancel = slot.begin_fetch(fetch_lease, FetchOrigin::OnDemand);
        state.on_demand = Some(OnDemandFetch {
            key: key.clone(),
            cancel: cancel.clone(),
        });
        self.publish(state);
        SpeakPlan::Fetch {
            lease: fetch_lease,
            cancel,
        }
    }

    /// Request audio unless the text is blank.
    async fn fetch(
        &self,
        key: &VoiceKey,
        text: &str,
        cancel: &CancellationToken,
    ) -> SpeechResult<AudioPayload> {
        let request = SynthesisRequest::new(key.clone(), text);
        request.validate()?;
        self.synth.synthesize(&request, cancel).await
    }

    /// Install a new playback session and run it in the background.
    fn start_playback(
        self: &Arc<Self>,
        state: &mut CoordinatorState,
        lease: LeaseId,
        key: &VoiceKey,
        source: AudioSource,
    ) {
        let stop = CancellationToken::new();
        state.playback = Some(PlaybackSlot {
            lease,
            stop: stop.clone(),
        });

        let this = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            let result = this.player.play(source, stop).await;
            this.finish_playback(lease, &key, result).await;
        });
    }

    async fn finish_playback(&self, lease: LeaseId, key: &VoiceKey, result: SpeechResult<()>) {
        let mut state = self.state.lock().await;
        if state.closed || !state.playback.as_ref().is_some_and(|p| p.lease == lease) {
            tracing::debug!(%key, %lease, "Ignoring stale playback completion");
            return;
        }
        state.playback = None;
        state.speak.busy = false;
        match result {
            Ok(()) => tracing::debug!(%key, "Playback finished"),
            Err(e) if e.is_cancelled() => tracing::debug!(%key, "Playback stopped"),
            Err(e) => {
                tracing::warn!(%key, error = %e, "Playback failed");
                state.speak.error = Some(PLAYBACK_FAILED_MESSAGE.to_string());
            }
        }
        self.publish(&state);
    }

    /// Cancel everything and release every cached source.
    ///
    /// Idempotent. Afterwards `speak` returns `Superseded` without side
    /// effects and no further snapshots are published.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.close();
        // Final snapshot goes out directly since `publish` is muted once closed
        self.snapshot_tx.send_replace(state.snapshot());
        tracing::info!("Voice cache torn down");
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Snapshot of a single key.
    pub fn entry(&self, key: &VoiceKey) -> Option<CacheEntrySnapshot> {
        self.snapshot_tx.borrow().entry(key).cloned()
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Wait until no entry is `Loading`.
    pub async fn wait_until_settled(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(CoordinatorSnapshot::is_settled).await;
    }

    /// Whether `teardown` has run.
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    fn publish(&self, state: &CoordinatorState) {
        if state.closed {
            return;
        }
        self.snapshot_tx.send_replace(state.snapshot());
    }
}

impl std::fmt::Debug for VoiceCacheCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCacheCoordinator")
            .field("snapshot", &*self.snapshot_tx.borrow())
            .finish_non_exhaustive()
    }
}
