//! User configuration
//!
//! Read from a TOML file; every field has a default so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```toml
//! target_language = "ja"
//! min_word_length = 5
//! known_words = ["todo", "config"]
//! known_popular_word_count = 100
//!
//! [custom_translations]
//! "pull request" = "プルリクエスト"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_language: String,
    pub target_language: String,
    /// Phrases shorter than this (in characters) are never translated
    pub min_word_length: usize,
    /// Words the reader already knows; compared case-insensitively
    pub known_words: Vec<String>,
    /// Also treat this many of the most frequent English words as known
    pub known_popular_word_count: usize,
    /// Fixed translations that take precedence over the provider
    pub custom_translations: HashMap<String, String>,
    /// Falls back to `GOOGLE_TRANSLATE_API_KEY` when unset
    pub google_api_key: Option<String>,
    /// Proxy or compatible endpoint for the Google Translate v2 API
    pub google_base_url: Option<String>,
    pub cache_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "zh-CN".to_string(),
            min_word_length: 4,
            known_words: Vec::new(),
            known_popular_word_count: 0,
            custom_translations: HashMap::new(),
            google_api_key: None,
            google_base_url: None,
            cache_path: PathBuf::from("interline-cache.json"),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Google API key from the file, else from `GOOGLE_TRANSLATE_API_KEY`
    pub fn api_key(&self) -> Option<String> {
        let present = |key: &String| !key.trim().is_empty();
        self.google_api_key
            .clone()
            .filter(present)
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(present))
    }

    /// Custom translations keyed the same way as the cache
    pub fn custom_translation_map(&self) -> HashMap<String, String> {
        self.custom_translations
            .iter()
            .map(|(phrase, translation)| (crate::cache::cache_key(phrase), translation.clone()))
            .collect()
    }
}
