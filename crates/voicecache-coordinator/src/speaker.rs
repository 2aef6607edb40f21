//! Generate-on-click speaker without a cache.
//!
//! Every `speak` cancels the previous request and stops the previous
//! playback, then fetches fresh audio. The fetched source lives only for the
//! duration of its playback.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use voicecache_core::error::PLAYBACK_FAILED_MESSAGE;
use voicecache_core::{
    AudioOrigin, AudioPlayerPort, AudioSource, AudioSourceRegistry, SpeakOutcome, SpeechError,
    SpeechResult, SynthesisPort, SynthesisRequest, VoiceKey, VoicePrompt,
};

use crate::lease::{LeaseCounter, LeaseId};

/// Status line of a [`ClickSpeaker`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickStatus {
    /// A request is in flight or its audio is playing.
    pub busy: bool,
    /// User-visible error from the last click.
    pub error: Option<String>,
    /// How long the last successful generation took.
    pub elapsed: Option<Duration>,
    /// The voice and text most recently clicked.
    pub selection: Option<VoicePrompt>,
}

#[derive(Debug)]
struct InFlight {
    cancel: CancellationToken,
    started_at: Instant,
}

#[derive(Debug)]
struct ActivePlayback {
    lease: LeaseId,
    stop: CancellationToken,
    source: AudioSource,
}

impl ActivePlayback {
    fn stop(self) {
        self.stop.cancel();
        self.source.release();
    }
}

#[derive(Debug, Default)]
struct ClickState {
    lease: Option<LeaseId>,
    request: Option<InFlight>,
    playback: Option<ActivePlayback>,
    status: ClickStatus,
    closed: bool,
}

impl ClickState {
    fn interrupt(&mut self) {
        if let Some(request) = self.request.take() {
            request.cancel.cancel();
        }
        if let Some(playback) = self.playback.take() {
            playback.stop();
        }
    }
}

/// Speaker that generates audio on every click.
pub struct ClickSpeaker {
    synth: Arc<dyn SynthesisPort>,
    registry: Arc<dyn AudioSourceRegistry>,
    player: Arc<dyn AudioPlayerPort>,
    state: Mutex<ClickState>,
    leases: LeaseCounter,
    status_tx: watch::Sender<ClickStatus>,
}

impl ClickSpeaker {
    pub fn new(
        synth: Arc<dyn SynthesisPort>,
        registry: Arc<dyn AudioSourceRegistry>,
        player: Arc<dyn AudioPlayerPort>,
    ) -> Arc<Self> {
        let (status_tx, _) = watch::channel(ClickStatus::default());
        Arc::new(Self {
            synth,
            registry,
            player,
            state: Mutex::new(ClickState::default()),
            leases: LeaseCounter::default(),
            status_tx,
        })
    }

    /// Generate `text` in voice `key` and start playing it.
    pub async fn speak(
        self: &Arc<Self>,
        key: impl Into<VoiceKey>,
        text: impl Into<String>,
    ) -> SpeakOutcome {
        let key = key.into();
        let text = text.into();
        let lease = self.leases.mint();
        let request = SynthesisRequest::new(key.clone(), text.clone());

        let cancel = {
            let mut state = self.state.lock().await;
            if state.closed {
                return SpeakOutcome::Superseded { key };
            }
            state.interrupt();
            state.lease = Some(lease);
            state.status = ClickStatus {
                busy: true,
                error: None,
                elapsed: None,
                selection: Some(VoicePrompt::new(key.clone(), text)),
            };

            if let Err(e) = request.validate() {
                return self.fail(&mut state, key, &e);
            }

            let cancel = CancellationToken::new();
            state.request = Some(InFlight {
                cancel: cancel.clone(),
                started_at: Instant::now(),
            });
            self.publish(&state);
            cancel
        };

        tracing::debug!(%key, %lease, "Generating speech");
        let result = self.synth.synthesize(&request, &cancel).await;

        let mut state = self.state.lock().await;
        if state.closed || state.lease != Some(lease) {
            tracing::debug!(%key, "Click superseded while generating");
            return SpeakOutcome::Superseded { key };
        }
        let Some(in_flight) = state.request.take() else {
            return SpeakOutcome::Superseded { key };
        };

        let source = match result.and_then(|payload| {
            AudioSource::acquire(Arc::clone(&self.registry), payload)
        }) {
            Ok(source) => source,
            Err(e) if e.is_cancelled() => {
                state.status.busy = false;
                self.publish(&state);
                return SpeakOutcome::Superseded { key };
            }
            Err(e) => return self.fail(&mut state, key, &e),
        };

        let elapsed = in_flight.started_at.elapsed();
        tracing::debug!(%key, elapsed_ms = elapsed.as_millis(), "Speech generated");
        state.status.elapsed = Some(elapsed);
        self.start_playback(&mut state, lease, &key, source);
        self.publish(&state);

        SpeakOutcome::Playing {
            key,
            source: AudioOrigin::Fetched,
        }
    }

    fn fail(&self, state: &mut ClickState, key: VoiceKey, error: &SpeechError) -> SpeakOutcome {
        let message = error.user_message();
        tracing::warn!(%key, error = %error, "Speech generation failed");
        state.status.busy = false;
        state.status.error = Some(message.clone());
        self.publish(state);
        SpeakOutcome::Failed { key, message }
    }

    fn start_playback(
        self: &Arc<Self>,
        state: &mut ClickState,
        lease: LeaseId,
        key: &VoiceKey,
        source: AudioSource,
    ) {
        let stop = CancellationToken::new();
        state.playback = Some(ActivePlayback {
            lease,
            stop: stop.clone(),
            source: source.clone(),
        });

        let this = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            let result = this.player.play(source.clone(), stop).await;
            source.release();
            this.finish_playback(lease, &key, result).await;
        });
    }

    async fn finish_playback(&self, lease: LeaseId, key: &VoiceKey, result: SpeechResult<()>) {
        let mut state = self.state.lock().await;
        if state.closed || !state.playback.as_ref().is_some_and(|p| p.lease == lease) {
            return;
        }
        state.playback = None;
        state.status.busy = false;
        if let Err(e) = result {
            if !e.is_cancelled() {
                tracing::warn!(%key, error = %e, "Playback failed");
                state.status.error = Some(PLAYBACK_FAILED_MESSAGE.to_string());
            }
        }
        self.publish(&state);
    }

    /// Abort the in-flight request without reporting an error.
    ///
    /// Playback that already started keeps going.
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        let Some(request) = state.request.take() else {
            return;
        };
        request.cancel.cancel();
        state.lease = None;
        state.status.busy = false;
        self.publish(&state);
        tracing::debug!("Generation cancelled");
    }

    /// Running time of the in-flight request, if any.
    pub async fn elapsed_so_far(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        state.request.as_ref().map(|r| r.started_at.elapsed())
    }

    /// Cancel the request, stop playback and release its source. Idempotent.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.interrupt();
        state.lease = None;
        state.status.busy = false;
        self.publish(&state);
        state.closed = true;
    }

    /// Current status.
    pub fn status(&self) -> ClickStatus {
        self.status_tx.borrow().clone()
    }

    /// Receiver that sees every published status.
    pub fn subscribe(&self) -> watch::Receiver<ClickStatus> {
        self.status_tx.subscribe()
    }

    fn publish(&self, state: &ClickState) {
        if state.closed {
            return;
        }
        self.status_tx.send_replace(state.status.clone());
    }
}

impl std::fmt::Debug for ClickSpeaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickSpeaker")
            .field("status", &*self.status_tx.borrow())
            .finish_non_exhaustive()
    }
}
