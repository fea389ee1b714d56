//! Phrase extraction
//!
//! A phrase is a run of natural words on one line: each word is a letter
//! followed by lowercase letters (optionally with a `'s`-style suffix), and
//! words are separated by spaces or tabs. Word boundaries are required on
//! both ends, so identifiers like `displayMessage`, `snake_case` or `v2`
//! never produce a phrase. A phrase directly followed by an inline
//! annotation `「…」` has already been translated.

use regex::Regex;
use std::sync::LazyLock;

static PHRASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Group 1: the phrase. Group 2: an inline annotation, if present.
    Regex::new(
        r"\b([A-Za-z][a-z]*(?:'[a-z]+)?(?:[ \t]+[A-Za-z][a-z]*(?:'[a-z]+)?)*)\b(?:[ \t]*「([^」\n]*)」)?",
    )
    .expect("phrase pattern is valid")
});

pub const ANNOTATION_OPEN: char = '「';
pub const ANNOTATION_CLOSE: char = '」';

/// A candidate phrase found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    pub phrase: String,
    /// Byte offset of `raw_match` in the scanned text
    pub match_index: usize,
    /// The phrase plus its inline annotation, if any
    pub raw_match: String,
    pub already_translated: bool,
}

/// Restartable scanner over the phrases of a text
///
/// Yields matches in increasing `match_index` order. [`PhraseScanner::skip_to`]
/// moves the cursor forward so a resolved comment or string is not scanned
/// again.
#[derive(Debug, Clone)]
pub struct PhraseScanner<'t> {
    text: &'t str,
    cursor: usize,
}

impl<'t> PhraseScanner<'t> {
    pub fn new(text: &'t str) -> Self {
        PhraseScanner { text, cursor: 0 }
    }

    /// Offset where the next search starts
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Resume scanning at `offset`; never moves the cursor backward
    pub fn skip_to(&mut self, offset: usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.cursor = self.cursor.max(offset);
    }
}

impl Iterator for PhraseScanner<'_> {
    type Item = PhraseMatch;

    fn next(&mut self) -> Option<PhraseMatch> {
        if self.cursor >= self.text.len() {
            return None;
        }
        let captures = PHRASE_REGEX.captures_at(self.text, self.cursor)?;
        let whole = captures.get(0)?;
        let phrase = captures.get(1)?;
        self.cursor = whole.end();

        Some(PhraseMatch {
            phrase: phrase.as_str().to_string(),
            match_index: whole.start(),
            raw_match: whole.as_str().to_string(),
            already_translated: captures.get(2).is_some(),
        })
    }
}

/// Scan `text` for phrases
pub fn extract_phrases(text: &str) -> PhraseScanner<'_> {
    PhraseScanner::new(text)
}

/// Render `phrase` followed by its inline annotation
pub fn annotate_phrase(phrase: &str, translation: &str) -> String {
    format!("{}{}{}{}", phrase, ANNOTATION_OPEN, translation, ANNOTATION_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(text: &str) -> Vec<String> {
        extract_phrases(text).map(|m| m.phrase).collect()
    }

    #[test]
    fn test_sentence_is_one_phrase() {
        let text = "displayMessage() // Show the welcome banner to new users";
        let matches: Vec<PhraseMatch> = extract_phrases(text).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].phrase, "Show the welcome banner to new users");
        assert_eq!(matches[0].match_index, 20);
        assert!(!matches[0].already_translated);
    }

    #[test]
    fn test_identifiers_are_not_phrases() {
        assert!(phrases("displayMessage() snake_case v2 HTTPServer").is_empty());
        assert!(phrases("x1 = y2 + __init__").is_empty());
    }

    #[test]
    fn test_phrase_stops_before_identifier() {
        assert_eq!(phrases("Show the welcomeBanner"), vec!["Show the"]);
        assert_eq!(phrases("let greeting = value"), vec!["let greeting", "value"]);
    }

    #[test]
    fn test_phrases_never_cross_lines() {
        assert_eq!(
            phrases("hello world\nsecond line"),
            vec!["hello world", "second line"]
        );
        assert!(phrases("a\nb\r\nc d").iter().all(|p| !p.contains('\n')));
    }

    #[test]
    fn test_apostrophe_words() {
        assert_eq!(phrases("the user's guide"), vec!["the user's guide"]);
    }

    #[test]
    fn test_annotated_phrase_is_already_translated() {
        let matches: Vec<PhraseMatch> = extract_phrases("open file「打开文件」 now").collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].phrase, "open file");
        assert_eq!(matches[0].raw_match, "open file「打开文件」");
        assert!(matches[0].already_translated);
        assert_eq!(matches[1].phrase, "now");
        assert!(!matches[1].already_translated);
    }

    #[test]
    fn test_annotate_phrase() {
        let annotated = annotate_phrase("save changes", "保存更改");
        let matches: Vec<PhraseMatch> = extract_phrases(&annotated).collect();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].already_translated);
    }

    // ========== Cursor Tests ==========

    #[test]
    fn test_match_indices_increase() {
        let text = "alpha beta, gamma; delta epsilon. zeta";
        let indices: Vec<usize> = extract_phrases(text).map(|m| m.match_index).collect();
        assert_eq!(indices, vec![0, 12, 19, 34]);
    }

    #[test]
    fn test_skip_to_resumes_after_offset() {
        let text = "alpha beta, gamma; delta epsilon. zeta";
        let mut scanner = extract_phrases(text);
        assert_eq!(scanner.next().map(|m| m.match_index), Some(0));
        scanner.skip_to(20);
        let rest: Vec<PhraseMatch> = scanner.collect();
        assert!(rest.iter().all(|m| m.match_index >= 20));
        // Landing inside "delta" leaves no word boundary until "epsilon"
        assert_eq!(rest[0].phrase, "epsilon");
    }

    #[test]
    fn test_skip_to_never_moves_backward() {
        let mut scanner = extract_phrases("one two, three four, five");
        scanner.next();
        scanner.next();
        let cursor = scanner.cursor();
        scanner.skip_to(0);
        assert_eq!(scanner.cursor(), cursor);
        assert_eq!(scanner.next().map(|m| m.phrase), Some("five".to_string()));
    }

    #[test]
    fn test_skip_to_past_end_and_inside_code_point() {
        let mut scanner = extract_phrases("你 ok");
        scanner.skip_to(1);
        assert_eq!(scanner.cursor(), 0);
        scanner.skip_to(100);
        assert!(scanner.next().is_none());
    }
}
