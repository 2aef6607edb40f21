//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where adapters are wired together:
//! - Synthesis client (via voicecache-http)
//! - Audio source registry (via voicecache-coordinator)
//! - Player (via voicecache-playback)
//!
//! Handlers receive the composed context and build coordinators from it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use voicecache_coordinator::{ClickSpeaker, LocalAudioRegistry, VoiceCacheCoordinator};
use voicecache_core::{AudioPlayerPort, SynthesisPort};
use voicecache_http::{HttpSynthesisClient, SynthesisClientConfig};
use voicecache_playback::FileSinkPlayer;

use crate::error::CliError;
use crate::parser::Cli;

/// Where played audio goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// Write each source to a file in this directory.
    Directory(PathBuf),
    /// Default output device.
    Speaker,
}

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Synthesis endpoint.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Playback target.
    pub playback: PlaybackTarget,
}

impl CliConfig {
    /// Build config from parsed global flags.
    pub fn from_cli(cli: &Cli) -> Self {
        let playback = if cli.speaker {
            PlaybackTarget::Speaker
        } else {
            PlaybackTarget::Directory(cli.out_dir.clone())
        };
        Self {
            endpoint: cli.endpoint.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
            playback,
        }
    }
}

/// Fully composed adapters for CLI commands.
pub struct CliContext {
    /// Synthesis endpoint client.
    pub synth: Arc<dyn SynthesisPort>,
    /// Registry backing every audio source.
    pub registry: Arc<LocalAudioRegistry>,
    /// Playback sink.
    pub player: Arc<dyn AudioPlayerPort>,
    /// File sink, when playing to a directory.
    pub file_sink: Option<Arc<FileSinkPlayer>>,
}

impl CliContext {
    /// Build a prefetching coordinator over these adapters.
    pub fn coordinator(&self) -> Arc<VoiceCacheCoordinator> {
        VoiceCacheCoordinator::new(
            Arc::clone(&self.synth),
            self.registry.clone(),
            Arc::clone(&self.player),
        )
    }

    /// Build a generate-on-click speaker over these adapters.
    pub fn click_speaker(&self) -> Arc<ClickSpeaker> {
        ClickSpeaker::new(
            Arc::clone(&self.synth),
            self.registry.clone(),
            Arc::clone(&self.player),
        )
    }
}

/// Bootstrap the CLI context from configuration.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let client_config = SynthesisClientConfig::new()
        .with_endpoint(config.endpoint)
        .with_timeout(config.timeout);
    let synth: Arc<dyn SynthesisPort> = Arc::new(HttpSynthesisClient::new(client_config)?);

    let (player, file_sink) = match config.playback {
        PlaybackTarget::Directory(dir) => {
            let sink = Arc::new(FileSinkPlayer::new(dir));
            let player: Arc<dyn AudioPlayerPort> = sink.clone();
            (player, Some(sink))
        }
        PlaybackTarget::Speaker => (speaker_player()?, None),
    };

    tracing::debug!(?file_sink, "CLI context ready");
    Ok(CliContext {
        synth,
        registry: Arc::new(LocalAudioRegistry::new()),
        player,
        file_sink,
    })
}

#[cfg(feature = "rodio")]
fn speaker_player() -> Result<Arc<dyn AudioPlayerPort>, CliError> {
    Ok(Arc::new(voicecache_playback::RodioPlayer::new()))
}

#[cfg(not(feature = "rodio"))]
fn speaker_player() -> Result<Arc<dyn AudioPlayerPort>, CliError> {
    Err(CliError::Config(
        "--speaker requires voicecache built with the `rodio` feature".to_string(),
    ))
}
