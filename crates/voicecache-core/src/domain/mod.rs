//! Domain types shared by the coordinator, its adapters and the UI boundary.

mod cache;
mod voice;

pub use cache::{
    AudioOrigin, CacheEntrySnapshot, CacheStatus, CoordinatorSnapshot, FetchOrigin, SpeakOutcome,
    SpeakStatus,
};
pub use voice::{VoiceCatalog, VoiceKey, VoicePrompt};
