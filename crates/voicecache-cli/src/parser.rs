//! Main CLI parser and top-level argument handling.
//!
//! Global options configure the synthesis endpoint and the playback sink;
//! each can also come from the environment (or a `.env` file).

use std::path::PathBuf;

use clap::Parser;
use voicecache_http::DEFAULT_ENDPOINT;

use crate::commands::Commands;

/// Command-line interface for the voice-audio cache.
#[derive(Debug, Parser)]
#[command(name = "voicecache")]
#[command(about = "Fetch, cache and play synthesized speech")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Synthesis endpoint receiving `{ "text", "lang" }` POSTs
    #[arg(long, global = true, env = "VOICECACHE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "VOICECACHE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory audio files are written to
    #[arg(
        long,
        global = true,
        env = "VOICECACHE_OUT_DIR",
        default_value = "voicecache-out",
        conflicts_with = "speaker"
    )]
    pub out_dir: PathBuf,

    /// Play through the default output device instead of writing files
    #[arg(long, global = true)]
    pub speaker: bool,

    #[command(subcommand)]
    pub command: Commands,
}
