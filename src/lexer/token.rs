/// Lexical category of a span of document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Code,
    Comment,
    String,
    Keyword,
}

/// Scopes whose full region is skipped as a unit
pub const COMMENT_SCOPES: &[ScopeKind] = &[ScopeKind::Comment];
pub const STRING_SCOPES: &[ScopeKind] = &[ScopeKind::String];

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScopeKind::Code => "code",
            ScopeKind::Comment => "comment",
            ScopeKind::String => "string",
            ScopeKind::Keyword => "keyword",
        };
        write!(f, "{}", name)
    }
}

/// A scope-tagged span on one line
///
/// Columns are byte offsets within the line; `end_column` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub scope: ScopeKind,
    pub start_column: usize,
    pub end_column: usize,
    /// The comment or string carries on at the start of the next line
    pub continues: bool,
}

impl Token {
    pub fn new(text: &str, scope: ScopeKind, start_column: usize, continues: bool) -> Self {
        Token {
            text: text.to_string(),
            scope,
            start_column,
            end_column: start_column + text.len(),
            continues,
        }
    }

    pub fn covers(&self, character: usize) -> bool {
        self.start_column <= character && character < self.end_column
    }
}
