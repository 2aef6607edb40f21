//! Voice keys and the fixed catalog of prompts prefetched at startup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier naming a (language, voice) pair, sent to the endpoint as `lang`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceKey(String);

impl VoiceKey {
    /// Create a new voice key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VoiceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VoiceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for VoiceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A voice key paired with the text to speak in that voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoicePrompt {
    /// Voice used for synthesis.
    pub key: VoiceKey,
    /// Text to synthesize.
    pub text: String,
}

impl VoicePrompt {
    /// Create a new prompt.
    pub fn new(key: impl Into<VoiceKey>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Ordered, duplicate-free set of prompts known at startup.
///
/// Adding a prompt for a key that is already present replaces its text but
/// keeps the original position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCatalog {
    prompts: Vec<VoicePrompt>,
}

impl VoiceCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            prompts: Vec::new(),
        }
    }

    /// Add (or replace) a prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: VoicePrompt) -> Self {
        self.insert(prompt);
        self
    }

    /// Add (or replace) a prompt in place.
    pub fn insert(&mut self, prompt: VoicePrompt) {
        if let Some(existing) = self.prompts.iter_mut().find(|p| p.key == prompt.key) {
            existing.text = prompt.text;
        } else {
            self.prompts.push(prompt);
        }
    }

    /// Look up the prompt for a key.
    pub fn get(&self, key: &VoiceKey) -> Option<&VoicePrompt> {
        self.prompts.iter().find(|p| &p.key == key)
    }

    /// Iterate prompts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &VoicePrompt> {
        self.prompts.iter()
    }

    /// Number of prompts.
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether the catalog has no prompts.
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::empty()
            .with_prompt(VoicePrompt::new("ar-EG-ShakirNeural", "مرحبا، كيف حالك؟"))
            .with_prompt(VoicePrompt::new("en-US-GuyNeural", "Hello, how are you?"))
            .with_prompt(VoicePrompt::new("fr-FR-HenriNeural", "Bonjour, comment allez-vous ?"))
    }
}

impl FromIterator<VoicePrompt> for VoiceCatalog {
    fn from_iter<I: IntoIterator<Item = VoicePrompt>>(iter: I) -> Self {
        let mut catalog = Self::empty();
        for prompt in iter {
            catalog.insert(prompt);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a VoiceCatalog {
    type Item = &'a VoicePrompt;
    type IntoIter = std::slice::Iter<'a, VoicePrompt>;

    fn into_iter(self) -> Self::IntoIter {
        self.prompts.iter()
    }
}
