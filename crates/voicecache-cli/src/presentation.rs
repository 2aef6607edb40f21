//! Terminal formatting for snapshots and outcomes.

use std::fmt::Write as _;
use std::time::Duration;

use voicecache_core::{AudioOrigin, CacheStatus, CoordinatorSnapshot, SpeakOutcome, SpeakStatus};

const fn status_label(status: CacheStatus) -> &'static str {
    match status {
        CacheStatus::Idle => "idle",
        CacheStatus::Loading => "loading",
        CacheStatus::Ready => "ready",
        CacheStatus::Failed => "failed",
    }
}

/// One row per cache entry: key, status, control state and error.
pub fn format_cache_table(snapshot: &CoordinatorSnapshot) -> String {
    let mut out = format!("{:<24} {:<8} {:<8} Error\n", "Voice", "Status", "Control");
    for (key, entry) in &snapshot.entries {
        let control = if entry.is_control_disabled() {
            "disabled"
        } else {
            "enabled"
        };
        let _ = writeln!(
            out,
            "{:<24} {:<8} {:<8} {}",
            key.as_str(),
            status_label(entry.status),
            control,
            entry.error_detail.as_deref().unwrap_or("--")
        );
    }
    out
}

/// Single status line: selection, busy flag and error.
pub fn format_status_line(status: &SpeakStatus) -> String {
    let selection = status
        .selection
        .as_ref()
        .map_or_else(|| "--".to_string(), |p| format!("{} \"{}\"", p.key, p.text));
    let state = if status.busy { "busy" } else { "idle" };
    match &status.error {
        Some(error) => format!("[{state}] {selection}: {error}"),
        None => format!("[{state}] {selection}"),
    }
}

/// One line describing a `speak` outcome.
pub fn format_outcome(outcome: &SpeakOutcome) -> String {
    match outcome {
        SpeakOutcome::Playing { key, source } => {
            let origin = match source {
                AudioOrigin::Cached => "cached",
                AudioOrigin::Fetched => "fetched",
            };
            format!("{key}: playing ({origin})")
        }
        SpeakOutcome::Failed { key, message } => format!("{key}: {message}"),
        SpeakOutcome::Superseded { key } => format!("{key}: superseded"),
    }
}

/// Elapsed generation time as shown next to the button.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use voicecache_core::{CacheEntrySnapshot, FetchOrigin, VoiceKey, VoicePrompt};

    use super::*;

    #[test]
    fn test_cache_table_rows() {
        let mut snapshot = CoordinatorSnapshot::default();
        snapshot.entries.insert(
            VoiceKey::new("en"),
            CacheEntrySnapshot {
                status: CacheStatus::Loading,
                has_audio: false,
                error_detail: None,
                origin: Some(FetchOrigin::Prefetch),
            },
        );
        snapshot.entries.insert(
            VoiceKey::new("fr"),
            CacheEntrySnapshot {
                status: CacheStatus::Failed,
                has_audio: false,
                error_detail: Some("TTS failed: 500 Internal Server Error ".to_string()),
                origin: Some(FetchOrigin::Prefetch),
            },
        );

        let table = format_cache_table(&snapshot);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("en"));
        assert!(lines[1].contains("loading"));
        assert!(lines[1].contains("disabled"));
        assert!(lines[2].contains("enabled"));
        assert!(lines[2].contains("TTS failed: 500"));
    }

    #[test]
    fn test_status_line() {
        let status = SpeakStatus {
            busy: false,
            error: Some("Playback failed".to_string()),
            selection: Some(VoicePrompt::new("en", "hello")),
        };
        assert_eq!(
            format_status_line(&status),
            "[idle] en \"hello\": Playback failed"
        );
        assert_eq!(format_status_line(&SpeakStatus::default()), "[idle] --");
    }

    #[test]
    fn test_outcome_and_elapsed() {
        let playing = SpeakOutcome::Playing {
            key: VoiceKey::new("en"),
            source: AudioOrigin::Cached,
        };
        assert_eq!(format_outcome(&playing), "en: playing (cached)");
        assert_eq!(format_elapsed(Duration::from_millis(1534)), "1.53s");
    }
}
