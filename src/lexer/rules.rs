//! Lexical rule sets
//!
//! A rule set is deliberately shallow: comment markers, string delimiters and
//! a keyword list are enough to tell natural-language text apart from code
//! without a grammar per language.

use std::collections::HashSet;
use std::path::Path;

/// Delimiters of a string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRule {
    pub open: String,
    pub close: String,
    /// Literal may span lines without an escaped line break
    pub multiline: bool,
    pub escape: Option<char>,
}

impl StringRule {
    pub fn new(open: &str, close: &str, multiline: bool, escape: Option<char>) -> Self {
        StringRule {
            open: open.to_string(),
            close: close.to_string(),
            multiline,
            escape,
        }
    }

    /// Same delimiter on both ends, backslash escapes, single line
    pub fn quoted(delimiter: &str) -> Self {
        Self::new(delimiter, delimiter, false, Some('\\'))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexicalRules {
    pub line_comments: Vec<String>,
    pub block_comments: Vec<(String, String)>,
    /// Tried in order; longer openers must come first (`"""` before `"`)
    pub strings: Vec<StringRule>,
    pub keywords: HashSet<String>,
}

const C_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "continue", "default",
    "delete", "do", "double", "else", "enum", "extends", "extern", "false", "final", "float",
    "for", "func", "go", "goto", "if", "implements", "import", "inline", "int", "interface",
    "long", "namespace", "new", "nil", "null", "nullptr", "package", "private", "protected",
    "public", "return", "short", "signed", "sizeof", "static", "struct", "switch", "template",
    "this", "throw", "throws", "true", "try", "typedef", "union", "unsigned", "using", "var",
    "virtual", "void", "volatile", "while",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

const JS_KEYWORDS: &[&str] = &[
    "abstract", "any", "as", "async", "await", "boolean", "break", "case", "catch", "class",
    "const", "continue", "debugger", "declare", "default", "delete", "do", "else", "enum",
    "export", "extends", "false", "finally", "for", "from", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null", "number", "of", "private",
    "protected", "public", "readonly", "return", "static", "string", "super", "switch", "this",
    "throw", "true", "try", "type", "typeof", "undefined", "var", "void", "while", "with",
    "yield",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "self", "try", "while", "with", "yield",
];

const SHELL_KEYWORDS: &[&str] = &[
    "case", "do", "done", "echo", "elif", "else", "esac", "exit", "export", "fi", "for",
    "function", "if", "in", "local", "read", "return", "select", "then", "until", "while",
];

fn keyword_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl LexicalRules {
    /// No comments, strings or keywords: every word is code
    pub fn plain_text() -> Self {
        Self::default()
    }

    /// C, C++, Java, Go, C#, Swift, Kotlin and friends
    pub fn c_like() -> Self {
        LexicalRules {
            line_comments: vec!["//".to_string()],
            block_comments: vec![("/*".to_string(), "*/".to_string())],
            strings: vec![StringRule::quoted("\""), StringRule::quoted("'")],
            keywords: keyword_set(C_KEYWORDS),
        }
    }

    /// A bare `'` is left out since lifetimes would open a literal. Only the
    /// char literals that hold a quote are matched, so `'"'` never opens a string.
    pub fn rust() -> Self {
        LexicalRules {
            line_comments: vec!["//".to_string()],
            block_comments: vec![("/*".to_string(), "*/".to_string())],
            strings: vec![
                StringRule::new("'\"", "'", false, None),
                StringRule::new("'\\\"", "'", false, None),
                StringRule::new("'\\'", "'", false, None),
                StringRule::quoted("\""),
            ],
            keywords: keyword_set(RUST_KEYWORDS),
        }
    }

    pub fn javascript() -> Self {
        LexicalRules {
            line_comments: vec!["//".to_string()],
            block_comments: vec![("/*".to_string(), "*/".to_string())],
            strings: vec![
                StringRule::quoted("\""),
                StringRule::quoted("'"),
                StringRule::new("`", "`", true, Some('\\')),
            ],
            keywords: keyword_set(JS_KEYWORDS),
        }
    }

    pub fn python() -> Self {
        LexicalRules {
            line_comments: vec!["#".to_string()],
            block_comments: Vec::new(),
            strings: vec![
                StringRule::new("\"\"\"", "\"\"\"", true, Some('\\')),
                StringRule::new("'''", "'''", true, Some('\\')),
                StringRule::quoted("\""),
                StringRule::quoted("'"),
            ],
            keywords: keyword_set(PYTHON_KEYWORDS),
        }
    }

    pub fn shell() -> Self {
        LexicalRules {
            line_comments: vec!["#".to_string()],
            block_comments: Vec::new(),
            strings: vec![
                StringRule::new("\"", "\"", true, Some('\\')),
                StringRule::new("'", "'", true, None),
            ],
            keywords: keyword_set(SHELL_KEYWORDS),
        }
    }

    /// Pick a rule set from the file extension, falling back to plain text
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "rs" => Self::rust(),
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "java" | "go" | "cs" | "swift" | "kt"
            | "kts" | "scala" | "dart" => Self::c_like(),
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => Self::javascript(),
            "py" | "pyi" => Self::python(),
            "sh" | "bash" | "zsh" => Self::shell(),
            _ => Self::plain_text(),
        }
    }

    pub fn with_keywords<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.keywords.extend(words.into_iter().map(str::to_string));
        self
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }
}
