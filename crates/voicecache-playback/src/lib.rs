#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod file_sink;
#[cfg(feature = "rodio")]
mod speaker;

pub use file_sink::FileSinkPlayer;
#[cfg(feature = "rodio")]
pub use speaker::RodioPlayer;
