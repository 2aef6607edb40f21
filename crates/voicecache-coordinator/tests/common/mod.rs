//! Hand-written fakes shared by the coordinator integration tests.
//!
//! - `FakeSynth`: scripted synthesis with per-key gates, delays and failures
//! - `FakePlayer`: records what was played and finishes on command
//! - `TrackingRegistry`: counts every revoke per source id

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{Notify, watch};
use voicecache_core::{
    AudioPayload, AudioPlayerPort, AudioSource, AudioSourceId, AudioSourceRegistry,
    CancellationToken, SpeechError, SpeechResult, SynthesisPort, SynthesisRequest,
};

/// Audio bytes the fake endpoint returns for `key`.
pub fn audio_for(key: &str) -> Bytes {
    Bytes::from(format!("audio:{key}"))
}

/// Wait (bounded) until `pred` holds for the latest published value.
pub async fn wait_until<T, F>(rx: &mut watch::Receiver<T>, pred: F)
where
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("condition not reached in time")
        .expect("sender dropped");
}

// ── Synthesis ──────────────────────────────────────────────────────

#[derive(Default)]
struct Script {
    responses: HashMap<String, SpeechResult<AudioPayload>>,
    gates: HashMap<String, CancellationToken>,
    delays: HashMap<String, Duration>,
    calls: Vec<SynthesisRequest>,
}

/// Scripted synthesis endpoint.
///
/// Unscripted keys succeed immediately with [`audio_for`]. A gated key
/// blocks until its gate opens or the request is cancelled.
#[derive(Default)]
pub struct FakeSynth {
    script: Mutex<Script>,
    called: Notify,
}

impl FakeSynth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every request for `key` with a non-2xx response.
    pub fn fail(&self, key: &str, status: u16, status_text: &str, body: &str) {
        self.script.lock().unwrap().responses.insert(
            key.to_string(),
            Err(SpeechError::remote(status, status_text, body)),
        );
    }

    /// Answer requests for `key` successfully again.
    pub fn succeed(&self, key: &str) {
        self.script.lock().unwrap().responses.remove(key);
    }

    /// Hold requests for `key` until the returned gate is cancelled.
    pub fn gate(&self, key: &str) -> CancellationToken {
        let gate = CancellationToken::new();
        self.script
            .lock()
            .unwrap()
            .gates
            .insert(key.to_string(), gate.clone());
        gate
    }

    /// Delay requests for `key` by `delay`.
    pub fn delay(&self, key: &str, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .delays
            .insert(key.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<SynthesisRequest> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, key: &str) -> usize {
        self.calls().iter().filter(|r| r.lang.as_str() == key).count()
    }

    /// Wait until at least `count` requests have been received.
    pub async fn wait_for_calls(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.called.notified();
                if self.calls().len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .expect("synthesis requests not received in time");
    }
}

#[async_trait]
impl SynthesisPort for FakeSynth {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        cancel: &CancellationToken,
    ) -> SpeechResult<AudioPayload> {
        let key = request.lang.as_str().to_string();
        let (gate, delay) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(request.clone());
            (script.gates.get(&key).cloned(), script.delays.get(&key).copied())
        };
        self.called.notify_waiters();

        if let Some(gate) = gate {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(SpeechError::Cancelled),
                () = gate.cancelled() => {}
            }
        }
        if let Some(delay) = delay {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(SpeechError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(SpeechError::Cancelled);
        }

        self.script
            .lock()
            .unwrap()
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(AudioPayload::new(audio_for(&key)).with_content_type("audio/mpeg")))
    }
}

// ── Playback ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Resolve as soon as playback starts.
    Instant,
    /// Resolve on `finish_current` or when stopped.
    UntilFinished,
    /// Resolve with a playback error.
    Fail,
}

/// Player that records every source it was asked to play.
pub struct FakePlayer {
    mode: Mutex<PlayMode>,
    played: Mutex<Vec<Bytes>>,
    stopped: Mutex<usize>,
    finish: Notify,
}

impl FakePlayer {
    pub fn new(mode: PlayMode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            played: Mutex::new(Vec::new()),
            stopped: Mutex::new(0),
            finish: Notify::new(),
        })
    }

    pub fn set_mode(&self, mode: PlayMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn played(&self) -> Vec<Bytes> {
        self.played.lock().unwrap().clone()
    }

    /// Number of playbacks that ended because they were stopped.
    pub fn stopped(&self) -> usize {
        *self.stopped.lock().unwrap()
    }

    /// Let the current `UntilFinished` playback end naturally.
    pub fn finish_current(&self) {
        self.finish.notify_one();
    }
}

#[async_trait]
impl AudioPlayerPort for FakePlayer {
    async fn play(&self, source: AudioSource, stop: CancellationToken) -> SpeechResult<()> {
        self.played.lock().unwrap().push(source.bytes());
        let mode = *self.mode.lock().unwrap();
        match mode {
            PlayMode::Instant => Ok(()),
            PlayMode::Fail => Err(SpeechError::playback("device unavailable")),
            PlayMode::UntilFinished => {
                tokio::select! {
                    () = stop.cancelled() => {
                        *self.stopped.lock().unwrap() += 1;
                    }
                    () = self.finish.notified() => {}
                }
                Ok(())
            }
        }
    }
}

// ── Registry ───────────────────────────────────────────────────────

/// Registry that remembers every id it handed out and how often each one
/// was revoked. Unlike the production registry, a second revoke is counted
/// instead of ignored.
#[derive(Default)]
pub struct TrackingRegistry {
    revokes: Mutex<Vec<usize>>,
}

impl TrackingRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn registered(&self) -> usize {
        self.revokes.lock().unwrap().len()
    }

    /// Revoke count per registered id, in registration order.
    pub fn revokes(&self) -> Vec<usize> {
        self.revokes.lock().unwrap().clone()
    }

    /// Every source registered so far was revoked exactly once.
    pub fn assert_each_released_once(&self) {
        let revokes = self.revokes();
        assert!(
            revokes.iter().all(|&n| n == 1),
            "revoke counts per source: {revokes:?}"
        );
    }
}

impl AudioSourceRegistry for TrackingRegistry {
    fn register(&self, _payload: &AudioPayload) -> SpeechResult<AudioSourceId> {
        let mut revokes = self.revokes.lock().unwrap();
        revokes.push(0);
        Ok(AudioSourceId(revokes.len() as u64 - 1))
    }

    fn revoke(&self, id: AudioSourceId) {
        let mut revokes = self.revokes.lock().unwrap();
        let count = usize::try_from(id.0)
            .ok()
            .and_then(|i| revokes.get_mut(i))
            .expect("revoke of an id that was never registered");
        *count += 1;
    }

    fn live_count(&self) -> usize {
        self.revokes.lock().unwrap().iter().filter(|&&n| n == 0).count()
    }
}
