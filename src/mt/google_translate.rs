//! Google Translate API provider
//!
//! Talks to the Google Translate v2 REST API. A whole newline-delimited batch
//! is sent as one `q` entry, and Google keeps the line structure of plain
//! text.
//!
//! # Authentication
//!
//! The provider loads the API key from the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable, or takes one explicitly via [`GoogleTranslateProvider::new`].
//!
//! # Example
//!
//! ```ignore
//! use interline::mt::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let result = provider.translate("Hello, world!", "en", "zh-CN").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::languages::google_code;
use crate::mt::translator::{MachineTranslator, validate_locale};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL for Google Translate API (overridable for proxies)
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Default endpoint of the v2 API
    pub const DEFAULT_BASE_URL: &'static str =
        "https://translation.googleapis.com/language/translate/v2";

    /// Maximum `q` entries per request (Google Translate API limit)
    const MAX_BATCH_SIZE: usize = 128;

    /// Maximum characters per request (30KB per Google Translate API limits)
    const MAX_CHARS_PER_REQUEST: usize = 30_000;

    /// Create a new GoogleTranslateProvider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a GoogleTranslateProvider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            MtError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    /// Route requests through a proxy or compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map both locales onto Google codes, rejecting what Google does not offer
    fn resolve_locales(
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<(&'static str, &'static str)> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        let source = google_code(source_locale).ok_or_else(|| {
            MtError::UnsupportedLanguage(format!(
                "Google Translate does not support source language '{}'",
                source_locale
            ))
        })?;
        let target = google_code(target_locale).ok_or_else(|| {
            MtError::UnsupportedLanguage(format!(
                "Google Translate does not support target language '{}'",
                target_locale
            ))
        })?;
        Ok((source, target))
    }

    /// Split a newline-delimited block into request-sized groups of lines
    ///
    /// Each group holds at most `MAX_BATCH_SIZE` lines totalling at most
    /// `MAX_CHARS_PER_REQUEST` bytes. Only a single line longer than the limit
    /// is an error.
    fn chunk_lines(text: &str) -> MtResult<Vec<Vec<&str>>> {
        let mut chunks: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0;

        for line in text.split('\n') {
            if line.len() > Self::MAX_CHARS_PER_REQUEST {
                return Err(MtError::TranslationError(format!(
                    "Line exceeds maximum length of {} characters",
                    Self::MAX_CHARS_PER_REQUEST
                )));
            }
            if !current.is_empty()
                && (current.len() == Self::MAX_BATCH_SIZE
                    || current_len + line.len() > Self::MAX_CHARS_PER_REQUEST)
            {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current_len += line.len();
            current.push(line);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        Ok(chunks)
    }

    /// Translate one group of lines, one `q` entry per line
    async fn translate_chunk(
        &self,
        lines: &[&str],
        source: &str,
        target: &str,
    ) -> MtResult<String> {
        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = json!({
            "q": lines,
            "source": source,
            "target": target,
            "format": "text"
        });

        debug!(source, target, lines = lines.len(), "Sending Google Translate request");
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        Self::parse_response(&json)
    }

    /// Pull `data.translations[*].translatedText` out of a v2 response body
    fn parse_response(json: &serde_json::Value) -> MtResult<String> {
        let translations = json["data"]["translations"].as_array().ok_or_else(|| {
            MtError::TranslationError(
                "Invalid API response: missing 'data.translations' array".to_string(),
            )
        })?;

        let texts = translations
            .iter()
            .map(|t| {
                t["translatedText"]
                    .as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        MtError::TranslationError(
                            "Invalid API response: missing 'translatedText' field".to_string(),
                        )
                    })
            })
            .collect::<MtResult<Vec<String>>>()?;

        Ok(texts.join("\n"))
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let (source, target) = Self::resolve_locales(source_locale, target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        let chunks = Self::chunk_lines(text)?;
        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            translated.push(self.translate_chunk(chunk, source, target).await?);
        }
        Ok(translated.join("\n"))
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
