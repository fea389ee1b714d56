//! Inline rendering
//!
//! Writes known translations back into the document text as
//! `phrase「translation」`, using the same classification as a translation
//! pass: only code-scope phrases are annotated.

use crate::cache::{CacheHandle, cache_key};
use crate::document::TextDocument;
use crate::extract::{ANNOTATION_CLOSE, ANNOTATION_OPEN, extract_phrases};
use crate::lexer::{LexicalRules, tokenize};
use crate::translate::{MatchContext, classify_match};
use std::collections::HashMap;

/// Annotate every code-scope phrase that has a custom or cached translation
///
/// Custom translations win over cached ones. Phrases that already carry an
/// annotation are left alone, so annotating twice changes nothing.
pub fn annotate(
    document: &impl TextDocument,
    rules: &LexicalRules,
    cache: &CacheHandle<'_>,
    custom_translations: &HashMap<String, String>,
) -> String {
    let text = document.text();
    let tokens = tokenize(text, rules);
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut scanner = extract_phrases(text);

    while let Some(found) = scanner.next() {
        if found.already_translated {
            continue;
        }
        match classify_match(document, &tokens, &found) {
            MatchContext::Code => {}
            MatchContext::Keyword | MatchContext::Enclosed { range: None, .. } => continue,
            MatchContext::Enclosed {
                range: Some(range), ..
            } => {
                scanner.skip_to(document.offset_at(range.end));
                continue;
            }
        }

        let translation = custom_translations
            .get(&cache_key(&found.phrase))
            .cloned()
            .or_else(|| cache.get(&found.phrase));
        let Some(translation) = translation.filter(|t| !t.trim().is_empty()) else {
            continue;
        };

        let end = found.match_index + found.phrase.len();
        out.push_str(&text[copied..end]);
        out.push(ANNOTATION_OPEN);
        out.push_str(translation.trim().trim_matches([ANNOTATION_OPEN, ANNOTATION_CLOSE]));
        out.push(ANNOTATION_CLOSE);
        copied = end;
    }

    out.push_str(&text[copied..]);
    out
}
