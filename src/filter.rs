//! Exclusion filter
//!
//! Decides which candidate phrases are not worth translating: too short,
//! already known to the reader, or without any letter.

use crate::config::Config;
use crate::words::POPULAR_ENGLISH_WORDS;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct PhraseFilter {
    min_word_length: usize,
    known_words: HashSet<String>,
}

/// Lowercase and drop everything except ASCII word characters, `.`, `_` and `-`
pub fn normalize_known_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl PhraseFilter {
    /// `known_words` come from the user; the `popular_count` most frequent
    /// English words are added on top
    pub fn new<'a>(
        min_word_length: usize,
        known_words: impl IntoIterator<Item = &'a str>,
        popular_count: usize,
    ) -> Self {
        let known_words = known_words
            .into_iter()
            .map(normalize_known_word)
            .chain(
                POPULAR_ENGLISH_WORDS
                    .iter()
                    .take(popular_count)
                    .map(|word| word.to_string()),
            )
            .collect();
        PhraseFilter {
            min_word_length,
            known_words,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.min_word_length,
            config.known_words.iter().map(String::as_str),
            config.known_popular_word_count,
        )
    }

    pub fn is_known_word(&self, word: &str) -> bool {
        self.known_words.contains(&normalize_known_word(word))
    }

    /// True when `phrase` should not be sent for translation
    pub fn is_excluded(&self, phrase: &str) -> bool {
        if phrase.chars().count() < self.min_word_length {
            return true;
        }
        if !phrase.chars().any(|c| c.is_ascii_alphabetic()) {
            return true;
        }
        self.is_known_word(phrase)
    }
}
