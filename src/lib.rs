//! Interline: machine translations for the natural-language phrases of a
//! source document.
//!
//! A pass tokenizes the document ([`lexer`]), scans it for phrases
//! ([`extract`]), skips those inside comments, strings and keywords
//! ([`scope`]), drops excluded ([`filter`]) and cached ([`cache`]) ones, and
//! sends the rest to a provider ([`mt`]) in one batch ([`translate`]).

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod filter;
pub mod lexer;
pub mod mt;
pub mod overlay;
pub mod scope;
pub mod translate;
pub mod words;

pub use cache::{CacheHandle, CacheKey, CacheStorage, JsonFileStorage, TranslationCacheStore};
pub use config::Config;
pub use document::{Position, Range, SourceDocument, TextDocument};
pub use error::{CacheError, ConfigError, TranslateError};
pub use extract::{PhraseMatch, PhraseScanner, extract_phrases};
pub use filter::PhraseFilter;
pub use lexer::{LexicalRules, ScopeKind, Token, tokenize};
pub use scope::find_scopes_range;
pub use translate::{DocumentTranslator, TranslationReport};
