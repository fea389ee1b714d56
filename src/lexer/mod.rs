//! Token classifier
//!
//! Splits a document into lines and tags spans of each line as
//! [`ScopeKind::Comment`], [`ScopeKind::String`], [`ScopeKind::Keyword`] or
//! [`ScopeKind::Code`] according to a [`LexicalRules`] set.
//!
//! Whitespace, punctuation and numbers in code are left uncovered; callers
//! treat uncovered characters as code. Comments and strings that stay open
//! at the end of a line produce one token per line, each flagged with
//! `continues` except the last. Malformed input never fails: an unterminated
//! block comment or multi-line string runs to the end of the document, an
//! unterminated single-line string to the end of its line.

pub mod rules;
pub mod token;

pub use rules::{LexicalRules, StringRule};
pub use token::{COMMENT_SCOPES, STRING_SCOPES, ScopeKind, Token};

/// Tokens of every line of a document, indexed by line
pub type DocumentTokens = Vec<Vec<Token>>;

/// A comment or string literal still waiting for its closing delimiter
#[derive(Debug, Clone, Copy)]
struct OpenScope<'r> {
    scope: ScopeKind,
    close: &'r str,
    escape: Option<char>,
    multiline: bool,
}

enum Closing {
    /// Byte offset just past the closing delimiter
    Closed(usize),
    Open { escaped_line_break: bool },
}

fn find_close(line: &str, from: usize, close: &str, escape: Option<char>) -> Closing {
    let mut chars = line[from..].char_indices();
    while let Some((i, c)) = chars.next() {
        if Some(c) == escape {
            if chars.next().is_none() {
                return Closing::Open {
                    escaped_line_break: true,
                };
            }
            continue;
        }
        let at = from + i;
        if line[at..].starts_with(close) {
            return Closing::Closed(at + close.len());
        }
    }
    Closing::Open {
        escaped_line_break: false,
    }
}

/// Emit the token for a scope starting at `token_start` whose body starts at
/// `body_start`; returns the column where scanning resumes.
fn scan_scope<'r>(
    line: &str,
    token_start: usize,
    body_start: usize,
    scope: OpenScope<'r>,
    tokens: &mut Vec<Token>,
    open: &mut Option<OpenScope<'r>>,
) -> usize {
    match find_close(line, body_start.min(line.len()), scope.close, scope.escape) {
        Closing::Closed(end) => {
            tokens.push(Token::new(&line[token_start..end], scope.scope, token_start, false));
            end
        }
        Closing::Open { escaped_line_break } => {
            let continues = scope.multiline || escaped_line_break;
            tokens.push(Token::new(&line[token_start..], scope.scope, token_start, continues));
            if continues {
                *open = Some(scope);
            }
            line.len()
        }
    }
}

fn tokenize_line<'r>(
    line: &str,
    rules: &'r LexicalRules,
    open: &mut Option<OpenScope<'r>>,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut col = 0;

    if let Some(scope) = open.take() {
        col = scan_scope(line, 0, 0, scope, &mut tokens, open);
    }

    while col < line.len() {
        let rest = &line[col..];

        if let Some((start, close)) = rules
            .block_comments
            .iter()
            .find(|(start, _)| rest.starts_with(start.as_str()))
        {
            let scope = OpenScope {
                scope: ScopeKind::Comment,
                close,
                escape: None,
                multiline: true,
            };
            col = scan_scope(line, col, col + start.len(), scope, &mut tokens, open);
            continue;
        }

        if rules
            .line_comments
            .iter()
            .any(|marker| rest.starts_with(marker.as_str()))
        {
            tokens.push(Token::new(rest, ScopeKind::Comment, col, false));
            break;
        }

        if let Some(rule) = rules
            .strings
            .iter()
            .find(|rule| rest.starts_with(rule.open.as_str()))
        {
            let scope = OpenScope {
                scope: ScopeKind::String,
                close: &rule.close,
                escape: rule.escape,
                multiline: rule.multiline,
            };
            col = scan_scope(line, col, col + rule.open.len(), scope, &mut tokens, open);
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        if c.is_alphabetic() || c == '_' {
            let len = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..len];
            let scope = if rules.is_keyword(word) {
                ScopeKind::Keyword
            } else {
                ScopeKind::Code
            };
            tokens.push(Token::new(word, scope, col, false));
            col += len;
        } else {
            col += c.len_utf8();
        }
    }

    tokens
}

/// Tokenize `text` line by line
///
/// The result has one entry per `\n`-separated line (so a trailing newline
/// yields a final empty line), matching [`crate::document::SourceDocument`]'s
/// line numbering. A `\r` before the line break is not part of any token.
pub fn tokenize(text: &str, rules: &LexicalRules) -> DocumentTokens {
    let mut open = None;
    text.split('\n')
        .map(|raw| {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            tokenize_line(line, rules, &mut open)
        })
        .collect()
}

/// Token covering `character`, if any
pub fn token_at(character: usize, tokens_of_line: &[Token]) -> Option<&Token> {
    let index = tokens_of_line.partition_point(|token| token.end_column <= character);
    tokens_of_line
        .get(index)
        .filter(|token| token.covers(character))
}

/// Scope at `character`; uncovered characters are code
pub fn scope_at(character: usize, tokens_of_line: &[Token]) -> ScopeKind {
    token_at(character, tokens_of_line).map_or(ScopeKind::Code, |token| token.scope)
}

fn has_scope(character: usize, tokens_of_line: &[Token], scope: ScopeKind) -> bool {
    token_at(character, tokens_of_line).is_some_and(|token| token.scope == scope)
}

pub fn is_comment(character: usize, tokens_of_line: &[Token]) -> bool {
    has_scope(character, tokens_of_line, ScopeKind::Comment)
}

pub fn is_string(character: usize, tokens_of_line: &[Token]) -> bool {
    has_scope(character, tokens_of_line, ScopeKind::String)
}

pub fn is_keyword(character: usize, tokens_of_line: &[Token]) -> bool {
    has_scope(character, tokens_of_line, ScopeKind::Keyword)
}
