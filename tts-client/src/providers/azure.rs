//! Azure Cognitive Services speech provider
//!
//! Direct HTTP implementation of the Azure text-to-speech REST API. The SSML
//! document is posted as-is; the response body is the encoded audio.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, TtsError};
use crate::provider::{SpeechSynthesizer, VoiceInfo};

/// Default audio container/codec requested from the service
pub const DEFAULT_OUTPUT_FORMAT: &str = "audio-24khz-96kbitrate-mono-mp3";

/// Default Azure region
pub const DEFAULT_REGION: &str = "eastus";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const USER_AGENT: &str = concat!("bible-audio/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the Azure speech service
#[derive(Debug, Clone)]
pub struct AzureSettings {
    pub subscription_key: String,
    pub region: String,
    pub output_format: String,
}

impl AzureSettings {
    pub fn new(subscription_key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            region: region.into(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }
}

/// Provider for Azure text-to-speech calls
pub struct AzureSynthesizer {
    settings: AzureSettings,
    client: Client,
}

impl AzureSynthesizer {
    /// Create a new Azure provider
    pub fn new(settings: AzureSettings) -> Result<Self> {
        if settings.subscription_key.trim().is_empty() {
            return Err(TtsError::MissingSubscriptionKey {
                provider: "Azure".to_string(),
                env_var: super::AZURE_KEY_ENV.to_string(),
            });
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TtsError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    fn synthesis_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.settings.region
        )
    }

    fn voices_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/voices/list",
            self.settings.region
        )
    }
}

/// Turn a non-success response into a typed error
async fn api_error(response: reqwest::Response) -> TtsError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body
    };

    TtsError::Api {
        message,
        status_code: Some(status.as_u16()),
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSynthesizer {
    async fn synthesize(&self, ssml: &str, voice_name: &str) -> Result<Vec<u8>> {
        log::debug!(
            "Azure synthesis: voice={} region={} ssml_bytes={}",
            voice_name,
            self.settings.region,
            ssml.len()
        );

        let response = self
            .client
            .post(self.synthesis_url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.settings.subscription_key)
            .header(OUTPUT_FORMAT_HEADER, &self.settings.output_format)
            .header("Content-Type", "application/ssml+xml")
            .body(ssml.to_string())
            .send()
            .await
            .map_err(|e| TtsError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TtsError::Request(format!("Failed to read audio body: {}", e)))?;

        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        Ok(audio.to_vec())
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>> {
        let response = self
            .client
            .get(self.voices_url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.settings.subscription_key)
            .send()
            .await
            .map_err(|e| TtsError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<Vec<VoiceInfo>>()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to parse voice list: {}", e)))
    }

    fn name(&self) -> &'static str {
        "Azure Speech"
    }
}
