//! Say command handler (generate on click).

use voicecache_core::SpeakOutcome;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_elapsed, format_outcome};

/// Generate `text` in `voice`, play it and report the generation time.
pub async fn execute(ctx: &CliContext, voice: &str, text: &str) -> Result<(), CliError> {
    let speaker = ctx.click_speaker();

    let outcome = tokio::select! {
        outcome = speaker.speak(voice, text) => outcome,
        _ = tokio::signal::ctrl_c() => {
            speaker.teardown().await;
            return Ok(());
        }
    };
    println!("{}", format_outcome(&outcome));

    let result = match outcome {
        SpeakOutcome::Playing { .. } => {
            if let Some(elapsed) = speaker.status().elapsed {
                println!("Generated in {}", format_elapsed(elapsed));
            }
            let mut status = speaker.subscribe();
            tokio::select! {
                _ = status.wait_for(|s| !s.busy) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
            speaker.status().error.map_or(Ok(()), |e| Err(CliError::Speech(e)))
        }
        SpeakOutcome::Failed { message, .. } => Err(CliError::Speech(message)),
        SpeakOutcome::Superseded { .. } => Ok(()),
    };

    if let Some(path) = ctx.file_sink.as_ref().and_then(|sink| sink.last_written()) {
        println!("Wrote {}", path.display());
    }
    speaker.teardown().await;
    result
}
