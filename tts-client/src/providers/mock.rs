//! Mock speech provider for testing
//!
//! Records what it was asked to synthesize and returns canned audio or a
//! canned failure.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::provider::{SpeechSynthesizer, VoiceInfo};

/// A mock synthesizer for exercising callers without the network
pub struct MockSynthesizer {
    /// Number of times synthesize() was called
    call_count: AtomicUsize,
    /// Error to return (None = always succeed)
    fail_with: Mutex<Option<TtsError>>,
    /// Audio bytes returned on success
    audio: Vec<u8>,
    /// SSML documents received, in call order
    received: Mutex<Vec<String>>,
    /// Voices returned by list_voices()
    voices: Vec<VoiceInfo>,
}

impl MockSynthesizer {
    /// Create a synthesizer that always returns the given audio bytes
    pub fn always_succeeds(audio: &[u8]) -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            audio: audio.to_vec(),
            received: Mutex::new(Vec::new()),
            voices: Vec::new(),
        }
    }

    /// Create a synthesizer that always fails with the given error
    pub fn always_fails(error: TtsError) -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
            audio: Vec::new(),
            received: Mutex::new(Vec::new()),
            voices: Vec::new(),
        }
    }

    /// Set the voices reported by list_voices()
    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get every SSML document passed to synthesize()
    pub fn received(&self) -> Vec<String> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, ssml: &str, _voice_name: &str) -> Result<Vec<u8>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(ssml.to_string());
        }

        let error = self.fail_with.lock().ok().and_then(|e| e.as_ref().map(clone_error));
        match error {
            Some(err) => Err(err),
            None => Ok(self.audio.clone()),
        }
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(self.voices.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Clone a TtsError (needed because TtsError doesn't implement Clone)
fn clone_error(err: &TtsError) -> TtsError {
    match err {
        TtsError::MissingSubscriptionKey { provider, env_var } => {
            TtsError::MissingSubscriptionKey {
                provider: provider.clone(),
                env_var: env_var.clone(),
            }
        }
        TtsError::Request(s) => TtsError::Request(s.clone()),
        TtsError::Api {
            message,
            status_code,
        } => TtsError::Api {
            message: message.clone(),
            status_code: *status_code,
        },
        TtsError::EmptyAudio => TtsError::EmptyAudio,
        TtsError::InvalidResponse(s) => TtsError::InvalidResponse(s.clone()),
    }
}
