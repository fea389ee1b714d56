use thiserror::Error;

/// Error types for the translation provider layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Provider is misconfigured (missing key, rejected credentials)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport failure talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Locale code is not well-formed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Locale code is well-formed but the provider does not offer it
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    /// Provider answered but the translation failed
    #[error("Translation error: {0}")]
    TranslationError(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MtError::NetworkError(format!("Request timed out: {}", err))
        } else if err.is_decode() {
            MtError::TranslationError(format!("Failed to decode response: {}", err))
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

/// Result type for provider operations
pub type MtResult<T> = Result<T, MtError>;
