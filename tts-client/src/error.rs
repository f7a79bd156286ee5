use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error(
        "Subscription key not found for {provider}. Set {env_var} environment variable, pass --key, or add it to the config."
    )]
    MissingSubscriptionKey { provider: String, env_var: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Synthesis returned no audio data")]
    EmptyAudio,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, TtsError>;
