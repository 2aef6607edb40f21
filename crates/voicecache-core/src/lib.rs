#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod audio;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types for convenience
pub use audio::{AudioPayload, AudioSource, AudioSourceId};
pub use domain::{
    AudioOrigin, CacheEntrySnapshot, CacheStatus, CoordinatorSnapshot, FetchOrigin, SpeakOutcome,
    SpeakStatus, VoiceCatalog, VoiceKey, VoicePrompt,
};
pub use error::{SpeechError, SpeechResult};
pub use ports::{AudioPlayerPort, AudioSourceRegistry, SynthesisPort, SynthesisRequest};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::MockSynthesisPort;

// Re-exported so adapters agree on a single cancellation primitive
pub use tokio_util::sync::CancellationToken;
