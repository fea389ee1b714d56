//! Machine translation providers
//!
//! The [`MachineTranslator`] trait is the only thing a translation pass
//! needs from a provider: translate one newline-delimited block of text
//! between two locales.
//!
//! # Example
//!
//! ```ignore
//! use interline::mt::{GoogleTranslateProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let translated = provider.translate("open file\nsave all", "en", "fr").await?;
//!     println!("{}", translated);
//!     Ok(())
//! }
//! ```
pub mod error;
pub mod google_translate;
pub mod languages;
pub mod mock;
pub mod translator;

pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use languages::{GOOGLE_LANGUAGES, google_code, language_name};
pub use mock::{MockMode, MockTranslator};
pub use translator::{MachineTranslator, base_language, validate_locale};
