#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Dev-dependencies exercised only by the integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use bytes as _;

mod coordinator;
mod lease;
mod registry;
mod speaker;

pub use coordinator::VoiceCacheCoordinator;
pub use registry::LocalAudioRegistry;
pub use speaker::{ClickSpeaker, ClickStatus};
