//! Speech provider implementations

mod azure;
pub mod mock;

pub use azure::{AzureSettings, AzureSynthesizer, DEFAULT_OUTPUT_FORMAT, DEFAULT_REGION};
pub use mock::MockSynthesizer;

use crate::error::{Result, TtsError};

/// Environment variable holding the Azure subscription key
pub const AZURE_KEY_ENV: &str = "AZURE_TTS_KEY";

/// Environment variable holding the Azure region
pub const AZURE_REGION_ENV: &str = "AZURE_TTS_REGION";

/// Resolve the subscription key: explicit flag, then environment, then config file
pub fn get_subscription_key(explicit: Option<&str>, configured: Option<&str>) -> Result<String> {
    let from_env = std::env::var(AZURE_KEY_ENV).ok();
    pick_key(explicit, from_env.as_deref(), configured)
}

fn pick_key(
    explicit: Option<&str>,
    from_env: Option<&str>,
    configured: Option<&str>,
) -> Result<String> {
    [explicit, from_env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TtsError::MissingSubscriptionKey {
            provider: "Azure".to_string(),
            env_var: AZURE_KEY_ENV.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let key = pick_key(Some("cli"), Some("env"), Some("file")).unwrap();
        assert_eq!(key, "cli");
    }

    #[test]
    fn test_env_before_config() {
        let key = pick_key(None, Some("env"), Some("file")).unwrap();
        assert_eq!(key, "env");
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let key = pick_key(Some(""), Some("   "), Some("file")).unwrap();
        assert_eq!(key, "file");
    }

    #[test]
    fn test_missing_everywhere() {
        let result = pick_key(None, None, None);
        assert!(matches!(
            result,
            Err(TtsError::MissingSubscriptionKey { .. })
        ));
    }
}
