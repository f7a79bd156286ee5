//! Speech synthesis client library for the bible-audio workspace
//!
//! Provides a narrow interface over text-to-speech vendors:
//! - Azure Cognitive Services (REST)
//! - Mock (tests)

pub mod error;
pub mod provider;
pub mod providers;

pub use error::{Result, TtsError};
pub use provider::{SpeechSynthesizer, VoiceInfo, english_voices};
pub use providers::{
    AZURE_KEY_ENV, AZURE_REGION_ENV, AzureSettings, AzureSynthesizer, DEFAULT_OUTPUT_FORMAT,
    DEFAULT_REGION, MockSynthesizer, get_subscription_key,
};
