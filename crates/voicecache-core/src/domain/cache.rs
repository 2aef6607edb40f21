//! Read-only cache and speak-status snapshots consumed by the presentation layer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::voice::{VoiceKey, VoicePrompt};

/// Lifecycle state of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Nothing fetched, or the last attempt was cancelled.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Audio is cached and playable.
    Ready,
    /// The last fetch failed; retried on the next `speak`.
    Failed,
}

impl CacheStatus {
    /// Whether this state can carry an audio source.
    pub const fn has_audio(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Which flow started the current (or last) fetch for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrigin {
    /// Started by `initialize`.
    Prefetch,
    /// Started by `speak` on a cache miss.
    OnDemand,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntrySnapshot {
    /// Lifecycle state.
    pub status: CacheStatus,
    /// Whether a playable source is cached.
    pub has_audio: bool,
    /// Error text, present only when `status` is `Failed`.
    pub error_detail: Option<String>,
    /// Origin of the current or last fetch.
    pub origin: Option<FetchOrigin>,
}

impl CacheEntrySnapshot {
    /// Whether the control for this key should be disabled.
    ///
    /// Only a loading prefetch with no audio yet disables a control; an
    /// on-demand fetch or failure never does.
    pub fn is_control_disabled(&self) -> bool {
        self.status == CacheStatus::Loading
            && self.origin == Some(FetchOrigin::Prefetch)
            && !self.has_audio
    }
}

/// Global speak status line: busy flag, last error and current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakStatus {
    /// A `speak` is resolving or its audio is playing.
    pub busy: bool,
    /// User-visible error from the last `speak`, if any.
    pub error: Option<String>,
    /// The voice and text most recently acted on.
    pub selection: Option<VoicePrompt>,
}

/// Everything the presentation layer renders from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    /// Per-key entries in catalog order.
    pub entries: IndexMap<VoiceKey, CacheEntrySnapshot>,
    /// Global speak status.
    pub speak: SpeakStatus,
}

impl CoordinatorSnapshot {
    /// Snapshot of a single key.
    pub fn entry(&self, key: &VoiceKey) -> Option<&CacheEntrySnapshot> {
        self.entries.get(key)
    }

    /// Status of a key, `Idle` when unknown.
    pub fn status(&self, key: &VoiceKey) -> CacheStatus {
        self.entries.get(key).map_or(CacheStatus::Idle, |e| e.status)
    }

    /// Whether no entry is loading.
    pub fn is_settled(&self) -> bool {
        self.entries
            .values()
            .all(|e| e.status != CacheStatus::Loading)
    }
}

/// Where the audio for a started playback came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOrigin {
    /// Cache hit; no request was made.
    Cached,
    /// Fetched on demand by this call.
    Fetched,
}

/// Result of a single `speak` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SpeakOutcome {
    /// Playback started; the busy flag clears when it ends.
    Playing {
        /// Voice being played.
        key: VoiceKey,
        /// Cache hit or fresh fetch.
        source: AudioOrigin,
    },
    /// The fetch failed; nothing is playing.
    Failed {
        /// Voice that failed.
        key: VoiceKey,
        /// User-visible message.
        message: String,
    },
    /// A newer call or teardown cancelled this one. Not an error.
    Superseded {
        /// Voice whose request was dropped.
        key: VoiceKey,
    },
}

impl SpeakOutcome {
    /// Voice this outcome refers to.
    pub const fn key(&self) -> &VoiceKey {
        match self {
            Self::Playing { key, .. } | Self::Failed { key, .. } | Self::Superseded { key } => key,
        }
    }

    /// Whether playback started.
    pub const fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    /// User-visible error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: CacheStatus, origin: Option<FetchOrigin>) -> CacheEntrySnapshot {
        CacheEntrySnapshot {
            status,
            has_audio: status.has_audio(),
            error_detail: None,
            origin,
        }
    }

    #[test]
    fn only_loading_prefetch_disables_control() {
        assert!(entry(CacheStatus::Loading, Some(FetchOrigin::Prefetch)).is_control_disabled());
        assert!(!entry(CacheStatus::Loading, Some(FetchOrigin::OnDemand)).is_control_disabled());
        assert!(!entry(CacheStatus::Failed, Some(FetchOrigin::OnDemand)).is_control_disabled());
        assert!(!entry(CacheStatus::Failed, Some(FetchOrigin::Prefetch)).is_control_disabled());
        assert!(!entry(CacheStatus::Ready, Some(FetchOrigin::Prefetch)).is_control_disabled());
    }

    #[test]
    fn snapshot_settles_when_nothing_loads() {
        let mut snapshot = CoordinatorSnapshot::default();
        snapshot.entries.insert(
            "en".into(),
            entry(CacheStatus::Ready, Some(FetchOrigin::Prefetch)),
        );
        snapshot.entries.insert(
            "fr".into(),
            entry(CacheStatus::Loading, Some(FetchOrigin::Prefetch)),
        );
        assert!(!snapshot.is_settled());

        snapshot.entries.get_mut(&VoiceKey::from("fr")).unwrap().status = CacheStatus::Failed;
        assert!(snapshot.is_settled());
        assert_eq!(snapshot.status(&"de".into()), CacheStatus::Idle);
    }

    #[test]
    fn outcome_accessors() {
        let failed = SpeakOutcome::Failed {
            key: "ar".into(),
            message: "TTS failed: 503 Service Unavailable overloaded".into(),
        };
        assert_eq!(failed.key().as_str(), "ar");
        assert!(!failed.is_playing());
        assert!(failed.error_message().unwrap().starts_with("TTS failed"));

        let superseded = SpeakOutcome::Superseded { key: "en".into() };
        assert_eq!(superseded.error_message(), None);
    }

    #[test]
    fn entry_snapshot_uses_camel_case() {
        let json = serde_json::to_value(CacheEntrySnapshot {
            status: CacheStatus::Failed,
            has_audio: false,
            error_detail: Some("boom".into()),
            origin: Some(FetchOrigin::Prefetch),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["hasAudio"], false);
        assert_eq!(json["errorDetail"], "boom");
        assert_eq!(json["origin"], "prefetch");
    }
}
