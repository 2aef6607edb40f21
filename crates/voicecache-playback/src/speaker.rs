//! Device playback through `rodio`.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use voicecache_core::{AudioPlayerPort, AudioSource, CancellationToken, SpeechError, SpeechResult};

/// How often the playback thread checks the stop token.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Plays sources on the default output device.
///
/// Each playback opens its own output stream on a blocking thread, since
/// `OutputStream` cannot cross threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioPlayer;

impl RodioPlayer {
    pub const fn new() -> Self {
        Self
    }
}

fn play_blocking(source: &AudioSource, stop: &CancellationToken) -> SpeechResult<()> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| SpeechError::playback(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| SpeechError::playback(e.to_string()))?;
    let decoder =
        Decoder::new(Cursor::new(source.bytes())).map_err(|e| SpeechError::playback(e.to_string()))?;
    sink.append(decoder);
    tracing::debug!(id = %source.id(), "Audio playback started");

    while !sink.empty() {
        if stop.is_cancelled() {
            sink.stop();
            tracing::debug!(id = %source.id(), "Audio playback stopped");
            return Ok(());
        }
        std::thread::sleep(STOP_POLL_INTERVAL);
    }

    tracing::debug!(id = %source.id(), "Playback finished naturally");
    Ok(())
}

#[async_trait]
impl AudioPlayerPort for RodioPlayer {
    async fn play(&self, source: AudioSource, stop: CancellationToken) -> SpeechResult<()> {
        if stop.is_cancelled() {
            return Ok(());
        }
        tokio::task::spawn_blocking(move || play_blocking(&source, &stop))
            .await
            .map_err(|e| SpeechError::playback(e.to_string()))?
    }
}
