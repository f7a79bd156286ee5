use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Voice metadata as reported by the vendor's voice listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceInfo {
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub voice_type: Option<String>,
}

/// Trait for speech synthesis providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize an SSML document into encoded audio bytes
    async fn synthesize(&self, ssml: &str, voice_name: &str) -> Result<Vec<u8>>;

    /// List the voices the provider offers
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;
}

/// Keep English voices only, ordered by locale then short name
pub fn english_voices(voices: Vec<VoiceInfo>) -> Vec<VoiceInfo> {
    let mut english: Vec<VoiceInfo> = voices
        .into_iter()
        .filter(|v| v.locale.starts_with("en-"))
        .collect();
    english.sort_by(|a, b| {
        a.locale
            .cmp(&b.locale)
            .then_with(|| a.short_name.cmp(&b.short_name))
    });
    english
}
