//! bible-audio configuration: persisted defaults, content layout, and the
//! per-run settings resolved from flags, environment, and config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tts_client::{AZURE_REGION_ENV, DEFAULT_OUTPUT_FORMAT, DEFAULT_REGION};

const DEFAULT_VOICE: &str = "en-US-JennyNeural";
// Slightly slower than normal for clarity
const DEFAULT_SPEECH_RATE: f32 = 0.9;

/// Allowed range for the stored prosody rate.
pub const SPEECH_RATE_RANGE: (f32, f32) = (0.5, 2.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BibleAudioConfig {
    /// Default voice short name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Prosody rate multiplier
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,

    /// Speech service region
    #[serde(default = "default_region")]
    pub region: String,

    /// Subscription key (AZURE_TTS_KEY or --key take precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_key: Option<String>,

    /// Audio format requested from the service
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_speech_rate() -> f32 {
    DEFAULT_SPEECH_RATE
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

impl Default for BibleAudioConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            speech_rate: default_speech_rate(),
            region: default_region(),
            subscription_key: None,
            output_format: default_output_format(),
        }
    }
}

impl BibleAudioConfig {
    /// Get the config file path: ~/.config/cli-programs/bible-audio.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Neither HOME nor USERPROFILE is set")?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("bible-audio.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: BibleAudioConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Store a new default rate, clamped to the supported range
    pub fn set_speech_rate(&mut self, rate: f32) {
        self.speech_rate = rate.clamp(SPEECH_RATE_RANGE.0, SPEECH_RATE_RANGE.1);
    }
}

/// Where content lives relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPaths {
    /// Content root; manifest entries are relative to it
    pub root: PathBuf,
    /// Destination for generated audio
    pub audio_dir: PathBuf,
    /// Root of the scripture markdown tree
    pub bibles_dir: PathBuf,
    /// Content listing
    pub manifest_path: PathBuf,
}

impl ContentPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            audio_dir: root.join("audio"),
            bibles_dir: root.join("bibles"),
            manifest_path: root.join("data").join("content_manifest.json"),
            root,
        }
    }
}

/// Values given on the command line, each overriding the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub voice: Option<String>,
    pub speech_rate: Option<f32>,
    pub region: Option<String>,
    pub subscription_key: Option<String>,
}

/// Settings for one run. Built once in `main` and passed by reference.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub voice: String,
    pub speech_rate: f32,
    pub region: String,
    pub subscription_key: Option<String>,
    pub output_format: String,
}

impl RunSettings {
    /// Resolve flags > environment > config file > defaults.
    pub fn resolve(config: &BibleAudioConfig, overrides: &Overrides) -> Self {
        let env_region = std::env::var(AZURE_REGION_ENV).ok();
        let subscription_key = tts_client::get_subscription_key(
            overrides.subscription_key.as_deref(),
            config.subscription_key.as_deref(),
        )
        .ok();

        Self::from_parts(config, overrides, env_region, subscription_key)
    }

    fn from_parts(
        config: &BibleAudioConfig,
        overrides: &Overrides,
        env_region: Option<String>,
        subscription_key: Option<String>,
    ) -> Self {
        let region = overrides
            .region
            .clone()
            .or(env_region)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| config.region.clone());

        Self {
            voice: overrides.voice.clone().unwrap_or_else(|| config.voice.clone()),
            speech_rate: overrides.speech_rate.unwrap_or(config.speech_rate),
            region,
            subscription_key,
            output_format: config.output_format.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BibleAudioConfig::default();
        assert_eq!(config.voice, "en-US-JennyNeural");
        assert_eq!(config.speech_rate, 0.9);
        assert_eq!(config.region, "eastus");
        assert_eq!(config.output_format, "audio-24khz-96kbitrate-mono-mp3");
        assert!(config.subscription_key.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = BibleAudioConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("cli-programs/bible-audio.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice = "en-GB-SoniaNeural"
speech_rate = 1.1
region = "westeurope"
subscription_key = "abc123"
"#;
        let config: BibleAudioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voice, "en-GB-SoniaNeural");
        assert_eq!(config.speech_rate, 1.1);
        assert_eq!(config.region, "westeurope");
        assert_eq!(config.subscription_key.as_deref(), Some("abc123"));
        assert_eq!(config.output_format, "audio-24khz-96kbitrate-mono-mp3");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: BibleAudioConfig = toml::from_str("").unwrap();
        assert_eq!(config.voice, "en-US-JennyNeural");
        assert_eq!(config.speech_rate, 0.9);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bible-audio.toml");

        let mut config = BibleAudioConfig::default();
        config.voice = "en-US-AriaNeural".to_string();
        config.save_to(&path).unwrap();

        let loaded = BibleAudioConfig::load_from(&path).unwrap();
        assert_eq!(loaded.voice, "en-US-AriaNeural");
        assert!(loaded.subscription_key.is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = BibleAudioConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.region, "eastus");
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "speech_rate = \"fast\"").unwrap();
        assert!(BibleAudioConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_set_speech_rate_clamps() {
        let mut config = BibleAudioConfig::default();
        config.set_speech_rate(5.0);
        assert_eq!(config.speech_rate, 2.0);
        config.set_speech_rate(0.1);
        assert_eq!(config.speech_rate, 0.5);
        config.set_speech_rate(1.25);
        assert_eq!(config.speech_rate, 1.25);
    }

    #[test]
    fn test_content_paths() {
        let paths = ContentPaths::new("/srv/reader");
        assert_eq!(paths.audio_dir, PathBuf::from("/srv/reader/audio"));
        assert_eq!(paths.bibles_dir, PathBuf::from("/srv/reader/bibles"));
        assert_eq!(
            paths.manifest_path,
            PathBuf::from("/srv/reader/data/content_manifest.json")
        );
    }

    #[test]
    fn test_run_settings_precedence() {
        let config = BibleAudioConfig {
            region: "westus".to_string(),
            ..Default::default()
        };

        let settings =
            RunSettings::from_parts(&config, &Overrides::default(), None, None);
        assert_eq!(settings.voice, "en-US-JennyNeural");
        assert_eq!(settings.speech_rate, 0.9);
        assert_eq!(settings.region, "westus");

        let settings = RunSettings::from_parts(
            &config,
            &Overrides::default(),
            Some("northeurope".to_string()),
            None,
        );
        assert_eq!(settings.region, "northeurope");

        let overrides = Overrides {
            voice: Some("en-AU-NatashaNeural".to_string()),
            speech_rate: Some(1.2),
            region: Some("eastasia".to_string()),
            subscription_key: None,
        };
        let settings = RunSettings::from_parts(
            &config,
            &overrides,
            Some("northeurope".to_string()),
            Some("key".to_string()),
        );
        assert_eq!(settings.voice, "en-AU-NatashaNeural");
        assert_eq!(settings.speech_rate, 1.2);
        assert_eq!(settings.region, "eastasia");
        assert_eq!(settings.subscription_key.as_deref(), Some("key"));
    }
}
