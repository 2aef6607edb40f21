//! Subcommands and their argument parsers.

use clap::Subcommand;
use voicecache_core::{VoiceCatalog, VoicePrompt};

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate speech on demand and report how long generation took
    Say {
        /// Voice key sent as `lang` (e.g. "en-US-GuyNeural")
        #[arg(long)]
        voice: String,
        /// Text to speak
        text: String,
    },

    /// Prefetch every voice and print the cache table
    Prefetch {
        /// Voice to prefetch as KEY=TEXT (repeatable; defaults to the built-in catalog)
        #[arg(long = "voice", value_parser = parse_voice_prompt)]
        voices: Vec<VoicePrompt>,
    },

    /// Prefetch, then speak `KEY TEXT` lines read from stdin
    Interactive {
        /// Voice to prefetch as KEY=TEXT (repeatable; defaults to the built-in catalog)
        #[arg(long = "voice", value_parser = parse_voice_prompt)]
        voices: Vec<VoicePrompt>,
    },
}

/// Parse a `KEY=TEXT` pair.
pub fn parse_voice_prompt(raw: &str) -> Result<VoicePrompt, String> {
    let (key, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=TEXT, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing voice key in '{raw}'"));
    }
    Ok(VoicePrompt::new(key, text))
}

/// Catalog from `--voice` arguments, or the built-in one when none were given.
pub fn catalog_from(voices: Vec<VoicePrompt>) -> VoiceCatalog {
    if voices.is_empty() {
        VoiceCatalog::default()
    } else {
        voices.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voice_prompt() {
        let prompt = tokio_test::assert_ok!(parse_voice_prompt("fr-FR-HenriNeural=Bonjour = salut"));
        assert_eq!(prompt.key.as_str(), "fr-FR-HenriNeural");
        assert_eq!(prompt.text, "Bonjour = salut");
    }

    #[test]
    fn test_parse_voice_prompt_rejects_malformed() {
        tokio_test::assert_err!(parse_voice_prompt("no-separator"));
        tokio_test::assert_err!(parse_voice_prompt("=text"));
    }

    #[test]
    fn test_catalog_defaults_when_empty() {
        assert_eq!(catalog_from(Vec::new()), VoiceCatalog::default());

        let catalog = catalog_from(vec![VoicePrompt::new("en", "hi")]);
        assert_eq!(catalog.len(), 1);
    }
}
