//! Document translation pass
//!
//! Turns a document into one deduplicated batch of code-scope phrases,
//! sends the batch to the provider as newline-delimited text, and folds the
//! answer back into the cache for the active language pair.
//!
//! Phrases inside comments and string literals are never queued: the whole
//! comment/string is recorded in the report and the scanner jumps past it.

use crate::cache::{CacheHandle, CacheStorage, TranslationCacheStore, cache_key};
use crate::config::Config;
use crate::document::{Range, TextDocument};
use crate::error::TranslateError;
use crate::extract::{PhraseMatch, extract_phrases};
use crate::filter::PhraseFilter;
use crate::lexer::{
    COMMENT_SCOPES, LexicalRules, STRING_SCOPES, ScopeKind, Token, scope_at, tokenize,
};
use crate::mt::MachineTranslator;
use crate::scope::find_scopes_range;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Separator between phrases in a batch request and its response
pub const BATCH_DELIMITER: &str = "\n";

/// Lexical context of a phrase match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchContext {
    Code,
    Keyword,
    /// Inside a comment or string; `range` is the whole region when it
    /// could be resolved
    Enclosed {
        scope: ScopeKind,
        range: Option<Range>,
    },
}

pub(crate) fn classify_match(
    document: &impl TextDocument,
    tokens: &[Vec<Token>],
    found: &PhraseMatch,
) -> MatchContext {
    let position = document.position_at(found.match_index);
    let line = tokens.get(position.line).map_or(&[][..], Vec::as_slice);
    match scope_at(position.character, line) {
        ScopeKind::Code => MatchContext::Code,
        ScopeKind::Keyword => MatchContext::Keyword,
        scope => {
            let ref_scopes = if scope == ScopeKind::Comment {
                COMMENT_SCOPES
            } else {
                STRING_SCOPES
            };
            MatchContext::Enclosed {
                scope,
                range: find_scopes_range(position, tokens, ref_scopes),
            }
        }
    }
}

/// Outcome of one translation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Phrases sent to the provider, in document order
    pub queued: Vec<String>,
    /// Comments the pass skipped over
    pub comments: Vec<String>,
    /// String literals the pass skipped over
    pub strings: Vec<String>,
    /// Cache entries written from the provider response
    pub translated: usize,
}

impl TranslationReport {
    pub fn provider_called(&self) -> bool {
        !self.queued.is_empty()
    }
}

/// Translates documents against a shared cache
pub struct DocumentTranslator {
    translator: Arc<dyn MachineTranslator>,
    store: Arc<TranslationCacheStore>,
    storage: Option<Arc<dyn CacheStorage>>,
    filter: PhraseFilter,
    custom_translations: HashMap<String, String>,
}

impl DocumentTranslator {
    /// Translator with the default filter, no custom translations and no
    /// persistence
    pub fn new(translator: Arc<dyn MachineTranslator>, store: Arc<TranslationCacheStore>) -> Self {
        DocumentTranslator {
            translator,
            store,
            storage: None,
            filter: PhraseFilter::from_config(&Config::default()),
            custom_translations: HashMap::new(),
        }
    }

    pub fn from_config(
        translator: Arc<dyn MachineTranslator>,
        store: Arc<TranslationCacheStore>,
        config: &Config,
    ) -> Self {
        Self::new(translator, store)
            .with_filter(PhraseFilter::from_config(config))
            .with_custom_translations(config.custom_translation_map())
    }

    pub fn with_filter(mut self, filter: PhraseFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Keys must already be in cache-key form, see [`cache_key`]
    pub fn with_custom_translations(mut self, custom_translations: HashMap<String, String>) -> Self {
        self.custom_translations = custom_translations;
        self
    }

    /// Persist the cache here after every successful batch
    pub fn with_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn store(&self) -> &TranslationCacheStore {
        &self.store
    }

    pub fn custom_translations(&self) -> &HashMap<String, String> {
        &self.custom_translations
    }

    /// Collect the phrases of `document` that need the provider
    ///
    /// Runs synchronously; the returned report has `translated == 0`.
    pub fn collect(
        &self,
        document: &impl TextDocument,
        rules: &LexicalRules,
        cache: &CacheHandle<'_>,
    ) -> TranslationReport {
        let tokens = tokenize(document.text(), rules);
        self.collect_with(document, cache, |found| {
            classify_match(document, &tokens, found)
        })
    }

    /// Scanning loop of [`collect`](Self::collect) over a given classifier
    fn collect_with(
        &self,
        document: &impl TextDocument,
        cache: &CacheHandle<'_>,
        mut classify: impl FnMut(&PhraseMatch) -> MatchContext,
    ) -> TranslationReport {
        let mut report = TranslationReport::default();
        let mut seen = HashSet::new();
        let mut scanner = extract_phrases(document.text());

        while let Some(found) = scanner.next() {
            if found.already_translated {
                continue;
            }
            let key = cache_key(&found.phrase);
            if self.filter.is_excluded(&found.phrase)
                || self.custom_translations.contains_key(&key)
                || seen.contains(&key)
                || cache.has(&found.phrase)
            {
                continue;
            }

            match classify(&found) {
                MatchContext::Code => {
                    seen.insert(key);
                    report.queued.push(found.phrase);
                }
                MatchContext::Keyword => {
                    debug!("Skipping '{}': starts on a keyword", found.phrase);
                }
                MatchContext::Enclosed { scope, range: None } => {
                    debug!("Skipping '{}': unresolved {} scope", found.phrase, scope);
                }
                MatchContext::Enclosed {
                    scope,
                    range: Some(range),
                } => {
                    let snippet = document.text_in(range).to_string();
                    debug!("Skipping {}: {:?}", scope, snippet);
                    if scope == ScopeKind::Comment {
                        report.comments.push(snippet);
                    } else {
                        report.strings.push(snippet);
                    }
                    scanner.skip_to(document.offset_at(range.end));
                }
            }
        }

        report
    }

    /// Translate every uncached code-scope phrase of `document`
    ///
    /// The provider is called at most once. The cache is only written after
    /// the provider answers, so a failed or cancelled pass leaves it as it
    /// was.
    pub async fn translate_document(
        &self,
        document: &impl TextDocument,
        rules: &LexicalRules,
        from: &str,
        to: &str,
    ) -> Result<TranslationReport, TranslateError> {
        let cache = self.store.cache_for(from, to);
        let mut report = self.collect(document, rules, &cache);

        if report.queued.is_empty() {
            info!(
                "Nothing to translate ({} comments, {} strings skipped)",
                report.comments.len(),
                report.strings.len()
            );
            return Ok(report);
        }

        let batch = report.queued.join(BATCH_DELIMITER);
        info!(
            "Translating {} phrases {} → {} with {}",
            report.queued.len(),
            from,
            to,
            self.translator.provider_name()
        );

        let translated = self
            .translator
            .translate(&batch, from, to)
            .await
            .map_err(|source| {
                error!("{} failed: {}", self.translator.provider_name(), source);
                TranslateError::Provider {
                    provider: self.translator.provider_name().to_string(),
                    source,
                }
            })?;

        for (phrase, translation) in report.queued.iter().zip(translated.split(BATCH_DELIMITER)) {
            let translation = translation.trim();
            if !translation.is_empty() {
                cache.set(phrase, translation);
                report.translated += 1;
            }
        }
        if report.translated < report.queued.len() {
            warn!(
                "Provider returned {} of {} translations",
                report.translated,
                report.queued.len()
            );
        }

        if let Some(storage) = &self.storage {
            if let Err(err) = self.store.persist(storage.as_ref()) {
                warn!("Failed to persist translation cache: {}", err);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::JsonFileStorage;
    use crate::document::SourceDocument;
    use crate::mt::{MockMode, MockTranslator, MtError};
    use std::time::Duration;

    const SCENARIO_COMMENT: &str = "displayMessage() // Show the welcome banner to new users";
    const BANNER: &str = "Show the welcome banner to new users";
    const BANNER_ZH: &str = "显示欢迎横幅给新用户";

    fn translator_with(mock: &MockTranslator) -> DocumentTranslator {
        DocumentTranslator::new(
            Arc::new(mock.clone()),
            Arc::new(TranslationCacheStore::new()),
        )
    }

    // ========== Scenario Tests ==========

    #[tokio::test]
    async fn test_comment_string_and_keyword_are_skipped() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new("// hello world\nlet greeting = \"hi there\"");

        let report = translator
            .translate_document(&doc, &LexicalRules::rust(), "en", "zh-CN")
            .await
            .unwrap();

        assert!(report.queued.is_empty());
        assert_eq!(report.comments, vec!["// hello world"]);
        assert_eq!(report.strings, vec!["\"hi there\""]);
        assert_eq!(mock.call_count(), 0);
        assert!(translator.store().is_empty());
    }

    #[tokio::test]
    async fn test_code_phrase_is_translated_once() {
        let mock = MockTranslator::with_mappings("zh-CN", [(BANNER, BANNER_ZH)]);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new(SCENARIO_COMMENT);
        let rules = LexicalRules::plain_text();

        let report = translator
            .translate_document(&doc, &rules, "en", "zh-CN")
            .await
            .unwrap();
        assert_eq!(report.queued, vec![BANNER]);
        assert_eq!(report.translated, 1);
        assert_eq!(mock.requests(), vec![BANNER]);

        let cache = translator.store().cache_for("en", "zh-CN");
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("show the welcome banner to new users").as_deref(),
            Some(BANNER_ZH)
        );

        let second = translator
            .translate_document(&doc, &rules, "en", "zh-CN")
            .await
            .unwrap();
        assert!(!second.provider_called());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_same_text_as_comment_is_not_queued() {
        let mock = MockTranslator::with_mappings("zh-CN", [(BANNER, BANNER_ZH)]);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new(SCENARIO_COMMENT);

        let report = translator
            .translate_document(&doc, &LexicalRules::c_like(), "en", "zh-CN")
            .await
            .unwrap();
        assert!(report.queued.is_empty());
        assert_eq!(report.comments, vec!["// Show the welcome banner to new users"]);
        assert_eq!(mock.call_count(), 0);
    }

    // ========== Classification Tests ==========

    #[tokio::test]
    async fn test_queued_phrases_never_come_from_comments_or_strings() {
        let src = "fn main() {\n    render(\"Loading the page\", ok);\n    /* Clean up\n       stale entries\n    */\n    shutdown gracefully now\n}\n// Final words here\n";
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new(src);
        let rules = LexicalRules::rust();

        let report = translator
            .translate_document(&doc, &rules, "en", "fr")
            .await
            .unwrap();

        assert_eq!(report.queued, vec!["render", "shutdown gracefully now"]);
        assert_eq!(report.strings, vec!["\"Loading the page\""]);
        assert_eq!(
            report.comments,
            vec!["/* Clean up\n       stale entries\n    */", "// Final words here"]
        );

        let tokens = tokenize(src, &rules);
        for found in extract_phrases(src) {
            if report.queued.contains(&found.phrase) {
                let position = doc.position_at(found.match_index);
                let line = &tokens[position.line];
                assert!(!crate::lexer::is_comment(position.character, line));
                assert!(!crate::lexer::is_string(position.character, line));
            }
        }
    }

    #[test]
    fn test_classify_match_against_tokens() {
        let doc = SourceDocument::new("note this down");
        // Hand-built tokens where no token covers the match position
        let tokens = vec![vec![Token::new("note", ScopeKind::Comment, 5, false)]];
        let found = extract_phrases(doc.text()).next().unwrap();
        assert_eq!(classify_match(&doc, &tokens, &found), MatchContext::Code);

        let tokens = vec![vec![Token::new("note this down", ScopeKind::Comment, 0, false)]];
        let context = classify_match(&doc, &tokens, &found);
        assert!(matches!(
            context,
            MatchContext::Enclosed {
                scope: ScopeKind::Comment,
                range: Some(_)
            }
        ));

        // A position past the last line resolves to nothing
        let empty: Vec<Vec<Token>> = Vec::new();
        assert_eq!(classify_match(&doc, &empty, &found), MatchContext::Code);
    }

    #[test]
    fn test_unresolved_scope_skips_only_that_phrase() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock);
        let cache = translator.store().cache_for("en", "fr");
        let doc = SourceDocument::new("note this down; then keep going");
        let tokens = vec![vec![Token::new("note this down", ScopeKind::Comment, 0, false)]];

        // Resolved: the comment is recorded and skipped
        let report = translator.collect_with(&doc, &cache, |found| {
            classify_match(&doc, &tokens, found)
        });
        assert_eq!(report.comments, vec!["note this down"]);
        assert_eq!(report.queued, vec!["then keep going"]);

        // Unresolved: nothing is recorded and the cursor stays put
        let report = translator.collect_with(&doc, &cache, |found| {
            match classify_match(&doc, &tokens, found) {
                MatchContext::Enclosed { scope, .. } => MatchContext::Enclosed { scope, range: None },
                context => context,
            }
        });
        assert!(report.comments.is_empty());
        assert!(report.strings.is_empty());
        assert_eq!(report.queued, vec!["then keep going"]);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_keyword_skip_does_not_hide_later_phrases() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new("return early; panic loudly");

        let report = translator
            .translate_document(&doc, &LexicalRules::rust(), "en", "de")
            .await
            .unwrap();
        assert_eq!(report.queued, vec!["panic loudly"]);
    }

    // ========== Filtering Tests ==========

    #[tokio::test]
    async fn test_duplicates_and_exclusions() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock)
            .with_filter(PhraseFilter::new(4, ["widget"], 0));
        let doc = SourceDocument::new("Open file; open file; widget; go; open file「x」; close file");

        let report = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "es")
            .await
            .unwrap();
        assert_eq!(report.queued, vec!["Open file", "close file"]);
    }

    #[tokio::test]
    async fn test_custom_translations_are_not_sent() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let custom = HashMap::from([(cache_key("Pull Request"), "拉取请求".to_string())]);
        let translator = translator_with(&mock).with_custom_translations(custom);
        let doc = SourceDocument::new("open a pull request\npull request");

        let report = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "zh-CN")
            .await
            .unwrap();
        assert_eq!(report.queued, vec!["open a pull request"]);
    }

    #[tokio::test]
    async fn test_cached_phrases_are_not_sent() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock);
        translator
            .store()
            .cache_for("en", "it")
            .set("save changes", "salva modifiche");
        let doc = SourceDocument::new("Save Changes, discard changes");

        let report = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "it")
            .await
            .unwrap();
        assert_eq!(report.queued, vec!["discard changes"]);
        assert_eq!(mock.requests(), vec!["discard changes"]);
    }

    // ========== Provider Response Tests ==========

    #[tokio::test]
    async fn test_batch_results_pair_positionally() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new("first phrase\nsecond phrase\nthird phrase");

        let report = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "fr")
            .await
            .unwrap();
        assert_eq!(mock.requests(), vec!["first phrase\nsecond phrase\nthird phrase"]);
        assert_eq!(report.translated, 3);

        let cache = translator.store().cache_for("en", "fr");
        for phrase in &report.queued {
            assert_eq!(cache.get(phrase), Some(format!("{}_fr", phrase)));
        }
    }

    #[tokio::test]
    async fn test_truncated_response_applies_prefix() {
        let mock = MockTranslator::new(MockMode::Truncate(2));
        let translator = translator_with(&mock);
        let doc = SourceDocument::new("alpha one\nbeta two\ngamma three");

        let report = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "fr")
            .await
            .unwrap();
        assert_eq!(report.queued.len(), 3);
        assert_eq!(report.translated, 2);

        let cache = translator.store().cache_for("en", "fr");
        assert!(cache.has("alpha one"));
        assert!(cache.has("beta two"));
        assert!(!cache.has("gamma three"));
    }

    #[tokio::test]
    async fn test_empty_translations_are_not_cached() {
        let mut map = HashMap::new();
        map.insert(("blank line".to_string(), "fr".to_string()), " ".to_string());
        let mock = MockTranslator::new(MockMode::Mappings(map));
        let translator = translator_with(&mock);
        let doc = SourceDocument::new("blank line\nfull line");

        let report = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "fr")
            .await
            .unwrap();
        assert_eq!(report.translated, 1);
        assert!(!translator.store().cache_for("en", "fr").has("blank line"));
    }

    #[tokio::test]
    async fn test_provider_error_leaves_cache_untouched() {
        let mock = MockTranslator::new(MockMode::Error("quota exceeded".to_string()));
        let translator = translator_with(&mock);
        translator.store().cache_for("en", "fr").set("kept entry", "entrée gardée");
        let doc = SourceDocument::new("brand new text");

        let err = translator
            .translate_document(&doc, &LexicalRules::plain_text(), "en", "fr")
            .await
            .unwrap_err();
        let TranslateError::Provider { provider, source } = &err;
        assert_eq!(provider, "Mock Translator");
        assert!(matches!(source, MtError::TranslationError(msg) if msg == "quota exceeded"));
        assert!(err.message().contains("quota exceeded"));
        assert_eq!(translator.store().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_pass_leaves_cache_untouched() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 500);
        let translator = translator_with(&mock);
        let doc = SourceDocument::new("slow network call");

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            translator.translate_document(&doc, &LexicalRules::plain_text(), "en", "fr"),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1);
        assert!(translator.store().is_empty());
    }

    // ========== Persistence Tests ==========

    #[tokio::test]
    async fn test_cache_persisted_after_batch() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(JsonFileStorage::new(dir.path().join("cache.json")));
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock).with_storage(storage.clone());

        translator
            .translate_document(
                &SourceDocument::new("persist me please"),
                &LexicalRules::plain_text(),
                "en",
                "nl",
            )
            .await
            .unwrap();

        let restored = TranslationCacheStore::new();
        restored.load_from(storage.as_ref()).unwrap();
        assert_eq!(
            restored.cache_for("en", "nl").get("persist me please").as_deref(),
            Some("persist me please_nl")
        );
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator =
            translator_with(&mock).with_storage(Arc::new(JsonFileStorage::new(&path)));

        translator
            .translate_document(&SourceDocument::new("1 + 2"), &LexicalRules::rust(), "en", "nl")
            .await
            .unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_persist_failure_does_not_fail_pass() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the cache file should be
        let storage = Arc::new(JsonFileStorage::new(dir.path()));
        let mock = MockTranslator::new(MockMode::Suffix);
        let translator = translator_with(&mock).with_storage(storage);

        let report = translator
            .translate_document(
                &SourceDocument::new("still works fine"),
                &LexicalRules::plain_text(),
                "en",
                "nl",
            )
            .await
            .unwrap();
        assert_eq!(report.translated, 1);
    }
}
