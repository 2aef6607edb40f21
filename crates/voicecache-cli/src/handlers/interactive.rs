//! Interactive command handler.
//!
//! Prefetches the catalog, then speaks each `KEY TEXT` line from stdin. Every
//! line is spoken in its own task, so a new line supersedes one that is still
//! fetching.

use tokio::io::{AsyncBufReadExt, BufReader};
use voicecache_core::VoicePrompt;

use crate::bootstrap::CliContext;
use crate::commands::catalog_from;
use crate::error::CliError;
use crate::presentation::{format_cache_table, format_outcome, format_status_line};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Status,
    Speak(VoicePrompt),
    Invalid(String),
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line == ":status" {
        return Input::Status;
    }
    match line.split_once(char::is_whitespace) {
        Some((key, text)) => Input::Speak(VoicePrompt::new(key, text.trim_start())),
        None => Input::Invalid(format!("expected `KEY TEXT`, got `{line}`")),
    }
}

/// Run the read-speak loop until EOF or Ctrl-C.
pub async fn execute(ctx: &CliContext, voices: Vec<VoicePrompt>) -> Result<(), CliError> {
    let catalog = catalog_from(voices);
    let coordinator = ctx.coordinator();
    coordinator.initialize(&catalog).await;

    // Print the status line whenever it changes
    let mut snapshots = coordinator.subscribe();
    let status_printer = tokio::spawn(async move {
        let mut last = String::new();
        while snapshots.changed().await.is_ok() {
            let line = format_status_line(&snapshots.borrow_and_update().speak);
            if line != last {
                println!("{line}");
                last = line;
            }
        }
    });

    println!("Type `KEY TEXT` to speak, `:status` for the cache table, Ctrl-D to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break Ok(()),
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(CliError::from(e)),
        };

        match parse_line(&line) {
            Input::Empty => {}
            Input::Status => print!("{}", format_cache_table(&coordinator.snapshot())),
            Input::Speak(prompt) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    let outcome = coordinator.speak(prompt.key, prompt.text).await;
                    println!("{}", format_outcome(&outcome));
                });
            }
            Input::Invalid(message) => eprintln!("{message}"),
        }
    };

    coordinator.teardown().await;
    status_printer.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), Input::Empty);
        assert_eq!(parse_line(":status"), Input::Status);
        assert_eq!(
            parse_line("en-US-GuyNeural  Hello there"),
            Input::Speak(VoicePrompt::new("en-US-GuyNeural", "Hello there"))
        );
        assert!(matches!(parse_line("lonely"), Input::Invalid(_)));
    }
}
