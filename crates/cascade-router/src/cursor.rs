//! Position-tracked view over the tokens of a path being matched

use std::fmt;

use crate::path::{self, Path, SEPARATOR};

/// Stateful cursor over the tokens of an incoming path
///
/// Only [`shift`](Self::shift) moves the position; peeking and iteration are
/// read-only. A scope that hands the remaining tokens to a child re-wraps the
/// cursor with [`into_relative`](Self::into_relative), which keeps the tokens
/// and position so the child sees what the parent already consumed.
///
/// # Examples
///
/// ```
/// use cascade_router::{Path, RouteResolutionCursor};
///
/// let mut cursor = RouteResolutionCursor::new(&Path::parse("/page/species/view"));
/// assert_eq!(cursor.peek(1), Some("species"));
/// assert_eq!(cursor.shift().as_deref(), Some("page"));
/// assert_eq!(cursor.remaining(), 2);
/// assert_eq!(cursor.remaining_path(), "/species/view/");
/// assert_eq!(cursor.source_path(), "/page/species/view/");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RouteResolutionCursor {
    tokens: Vec<String>,
    position: usize,
    relative: bool,
}

impl RouteResolutionCursor {
    /// Fresh top-level cursor; never relative
    pub fn new(path: &Path) -> Self {
        Self::from_tokens(path.segments().to_vec())
    }

    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            position: 0,
            relative: false,
        }
    }

    /// Cursor whose first `consumed` tokens count as already matched
    ///
    /// Used for scope-local relative navigation: the scope's root path is
    /// prepended and skipped so relative routes can match the suffix.
    pub fn resumed(tokens: Vec<String>, consumed: usize) -> Self {
        let position = consumed.min(tokens.len());
        Self {
            tokens,
            position,
            relative: true,
        }
    }

    /// Re-wraps this cursor as relative, keeping tokens and position
    pub fn into_relative(self) -> Self {
        Self {
            relative: true,
            ..self
        }
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    /// Reads the token `offset` positions ahead without consuming it
    pub fn peek(&self, offset: usize) -> Option<&str> {
        self.tokens
            .get(self.position + offset)
            .map(String::as_str)
    }

    /// Consumes the current token; stays put (returning `None`) once exhausted
    pub fn shift(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position)?.clone();
        self.position += 1;
        Some(token)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn initial_size(&self) -> usize {
        self.tokens.len()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Unconsumed tokens, without moving the cursor
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens[self.position..].iter().map(String::as_str)
    }

    /// The full original path regardless of position
    pub fn source_path(&self) -> String {
        path::join(&self.tokens, SEPARATOR)
    }

    /// The unconsumed suffix
    pub fn remaining_path(&self) -> String {
        path::join(&self.tokens[self.position..], SEPARATOR)
    }

    /// Tokens consumed between `start` and the current position, joined
    pub fn consumed_since(&self, start: usize) -> String {
        let start = start.min(self.position);
        path::join(&self.tokens[start..self.position], SEPARATOR)
    }
}

impl fmt::Debug for RouteResolutionCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteResolutionCursor")
            .field("source", &self.source_path())
            .field("position", &self.position)
            .field("relative", &self.relative)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(path: &str) -> RouteResolutionCursor {
        RouteResolutionCursor::new(&Path::parse(path))
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let cursor = cursor("/a/b");
        assert_eq!(cursor.peek(0), Some("a"));
        assert_eq!(cursor.peek(0), Some("a"));
        assert_eq!(cursor.peek(2), None);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_shift_is_idempotent_at_exhaustion() {
        let mut cursor = cursor("/a");
        assert_eq!(cursor.shift().as_deref(), Some("a"));
        assert_eq!(cursor.shift(), None);
        assert_eq!(cursor.shift(), None);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_derived_paths_follow_position() {
        let mut cursor = cursor("/a/b/c");
        cursor.shift();
        assert_eq!(cursor.remaining_path(), "/b/c/");
        assert_eq!(cursor.source_path(), "/a/b/c/");
        cursor.shift();
        cursor.shift();
        assert_eq!(cursor.remaining_path(), "/");
        assert_eq!(cursor.consumed_since(1), "/b/c/");
    }

    #[test]
    fn test_into_relative_keeps_position() {
        let mut cursor = cursor("/a/b/c");
        assert!(!cursor.is_relative());
        cursor.shift();
        let cursor = cursor.into_relative();
        assert!(cursor.is_relative());
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.initial_size(), 3);
        assert_eq!(cursor.iter().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_resumed_cursor() {
        let tokens = vec!["root".to_string(), "x".to_string()];
        let cursor = RouteResolutionCursor::resumed(tokens, 1);
        assert!(cursor.is_relative());
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.peek(0), Some("x"));
    }
}
