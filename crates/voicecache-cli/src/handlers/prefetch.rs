//! Prefetch command handler.

use voicecache_core::{CacheStatus, VoicePrompt};

use crate::bootstrap::CliContext;
use crate::commands::catalog_from;
use crate::error::CliError;
use crate::presentation::format_cache_table;

/// Prefetch every voice, print the cache table and tear down.
///
/// Fails if any voice could not be fetched.
pub async fn execute(ctx: &CliContext, voices: Vec<VoicePrompt>) -> Result<(), CliError> {
    let catalog = catalog_from(voices);
    let coordinator = ctx.coordinator();

    println!("Prefetching {} voice(s)...", catalog.len());
    coordinator.initialize(&catalog).await;
    tokio::select! {
        () = coordinator.wait_until_settled() => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Interrupted");
        }
    }

    let snapshot = coordinator.snapshot();
    print!("{}", format_cache_table(&snapshot));
    coordinator.teardown().await;

    let failed = snapshot
        .entries
        .values()
        .filter(|e| e.status == CacheStatus::Failed)
        .count();
    if failed > 0 {
        return Err(CliError::Speech(format!(
            "{failed} of {} voice(s) failed to prefetch",
            snapshot.entries.len()
        )));
    }
    Ok(())
}
