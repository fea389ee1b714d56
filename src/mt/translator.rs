//! Machine translation trait and locale helpers
//!
//! `MachineTranslator` is the seam between the document orchestrator and
//! whatever service produces translations (Google Translate, the mock, ...).
//! The orchestrator sends one newline-delimited batch per pass, so
//! implementations must keep line structure intact: line `i` of the answer is
//! the translation of line `i` of the request.
//!
//! # Example
//!
//! ```ignore
//! use interline::mt::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let result = provider.translate("Open file\nSave changes", "en", "fr").await?;
//!     println!("{}", result); // "Ouvrir le fichier\nEnregistrer les modifications"
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate `text` from `source_locale` to `target_locale`
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate; may contain several `\n`-separated segments
    /// * `source_locale` - Source language code (e.g., "en")
    /// * `target_locale` - Target language code (e.g., "zh-CN", "fr")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text, one line per input line
    /// * `Err(MtError)` - If translation fails, including an unsupported target
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging and in error reports to identify which provider failed.
    fn provider_name(&self) -> &str;
}

/// Strip region and script subtags: `en-US` → `en`, `zh-Hans` → `zh`
pub fn base_language(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores (following BCP 47 conventions).
///
/// # Example
///
/// ```ignore
/// validate_locale("en")?; // OK
/// validate_locale("zh-CN")?; // OK
/// validate_locale("invalid@code").unwrap_err(); // Error
/// ```
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
