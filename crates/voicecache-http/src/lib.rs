#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Dev-dependencies exercised only by the integration tests
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use wiremock as _;

mod client;
mod config;
mod error;

pub use client::HttpSynthesisClient;
pub use config::{DEFAULT_ENDPOINT, SynthesisClientConfig};
pub use error::HttpClientError;
