//! Player that writes audio to disk instead of a device.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use voicecache_core::{AudioPlayerPort, AudioSource, CancellationToken, SpeechError, SpeechResult};

/// Writes every played source to `<dir>/<source-id>.<ext>`.
///
/// Playback "ends" as soon as the file is written.
#[derive(Debug)]
pub struct FileSinkPlayer {
    dir: PathBuf,
    last_written: Mutex<Option<PathBuf>>,
}

impl FileSinkPlayer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_written: Mutex::new(None),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recently written file.
    pub fn last_written(&self) -> Option<PathBuf> {
        self.last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn path_for(&self, source: &AudioSource) -> PathBuf {
        self.dir
            .join(format!("{}.{}", source.id(), extension_for(source.content_type())))
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) {
        Some("audio/mpeg" | "audio/mp3") => "mp3",
        Some("audio/wav" | "audio/x-wav" | "audio/wave") => "wav",
        Some("audio/ogg") => "ogg",
        _ => "bin",
    }
}

#[async_trait]
impl AudioPlayerPort for FileSinkPlayer {
    async fn play(&self, source: AudioSource, stop: CancellationToken) -> SpeechResult<()> {
        if stop.is_cancelled() {
            return Ok(());
        }

        let path = self.path_for(&source);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SpeechError::playback(format!("{}: {e}", self.dir.display())))?;
        tokio::fs::write(&path, source.bytes())
            .await
            .map_err(|e| SpeechError::playback(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), bytes = source.bytes().len(), "Audio written");
        *self
            .last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use voicecache_core::{AudioPayload, AudioSourceId, AudioSourceRegistry};

    use super::*;

    struct NullRegistry;

    impl AudioSourceRegistry for NullRegistry {
        fn register(&self, _payload: &AudioPayload) -> SpeechResult<AudioSourceId> {
            Ok(AudioSourceId(7))
        }

        fn revoke(&self, _id: AudioSourceId) {}

        fn live_count(&self) -> usize {
            0
        }
    }

    fn source(content_type: &str) -> AudioSource {
        AudioSource::acquire(
            Arc::new(NullRegistry),
            AudioPayload::new(vec![1u8, 2, 3]).with_content_type(content_type),
        )
        .unwrap()
    }

    #[test]
    fn test_extension_from_content_type() {
        assert_eq!(extension_for(Some("audio/mpeg")), "mp3");
        assert_eq!(extension_for(Some("audio/wav; charset=binary")), "wav");
        assert_eq!(extension_for(Some("application/octet-stream")), "bin");
        assert_eq!(extension_for(None), "bin");
    }

    #[tokio::test]
    async fn test_play_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let player = FileSinkPlayer::new(dir.path().join("out"));

        tokio_test::assert_ok!(player.play(source("audio/mpeg"), CancellationToken::new()).await);

        let path = player.last_written().unwrap();
        assert_eq!(path, dir.path().join("out").join("audio-source-7.mp3"));
        assert_eq!(std::fs::read(path).unwrap(), vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_stopped_playback_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let player = FileSinkPlayer::new(dir.path());
        let stop = CancellationToken::new();
        stop.cancel();

        tokio_test::assert_ok!(player.play(source("audio/mpeg"), stop).await);
        assert_eq!(player.last_written(), None);
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_playback_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let player = FileSinkPlayer::new(blocker.join("nested"));

        let err = player
            .play(source("audio/mpeg"), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Playback { .. }));
        assert_eq!(err.user_message(), "Playback failed");
    }
}
