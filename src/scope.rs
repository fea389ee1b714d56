//! Scope range resolution
//!
//! Phrase matching works on absolute offsets while scopes are recorded per
//! line. Given a position inside a comment or string token, the resolver
//! walks to the first and last line of that comment/string so the caller can
//! skip the whole region in one step.

use crate::document::{Position, Range};
use crate::lexer::{ScopeKind, Token, token_at};

/// Expand `position` to the full region of the comment/string it sits in
///
/// Only tokens whose scope is listed in `ref_scopes` are considered. The
/// region grows backward while the previous line's last token continues into
/// this one, and forward while the current token continues onto a next line
/// that opens with the same scope at column 0. Returns `None` when no token
/// of a requested scope covers `position`.
pub fn find_scopes_range(
    position: Position,
    tokens_of_doc: &[Vec<Token>],
    ref_scopes: &[ScopeKind],
) -> Option<Range> {
    let token = token_at(position.character, tokens_of_doc.get(position.line)?)?;
    if !ref_scopes.contains(&token.scope) {
        return None;
    }
    let scope = token.scope;

    let mut start = Position::new(position.line, token.start_column);
    while start.character == 0 && start.line > 0 {
        match tokens_of_doc[start.line - 1].last() {
            Some(previous) if previous.scope == scope && previous.continues => {
                start = Position::new(start.line - 1, previous.start_column);
            }
            _ => break,
        }
    }

    let mut end_line = position.line;
    let mut last = token;
    while last.continues {
        match tokens_of_doc.get(end_line + 1).and_then(|line| line.first()) {
            Some(next) if next.scope == scope && next.start_column == 0 => {
                end_line += 1;
                last = next;
            }
            _ => break,
        }
    }

    Some(Range::new(start, Position::new(end_line, last.end_column)))
}
