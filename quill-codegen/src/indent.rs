//! Indent depth tracking for one render invocation.

use serde::Serialize;

use crate::{Error, Result};

/// Spaces per level when nothing else is configured.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Indent depth counter with a strict push/pop discipline.
///
/// The depth only changes through [`push`](Self::push) and
/// [`pop`](Self::pop); popping below zero fails instead of saturating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndentContext {
    depth: usize,
    width: usize,
}

impl IndentContext {
    /// Create a context at depth zero with `width` spaces per level.
    pub const fn new(width: usize) -> Self {
        Self { depth: 0, width }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Spaces per level.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Current indentation in columns.
    pub fn columns(&self) -> usize {
        self.depth * self.width
    }

    /// Whitespace prefix of the current depth.
    pub fn prefix(&self) -> String {
        " ".repeat(self.columns())
    }

    /// Enter one level.
    pub fn push(&mut self) {
        self.depth += 1;
    }

    /// Leave one level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndentationBalance`] when there is no matching push.
    pub fn pop(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Box::new(Error::IndentationBalance));
        }
        self.depth -= 1;
        Ok(())
    }
}

impl Default for IndentContext {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_balance() {
        let mut ctx = IndentContext::new(4);
        ctx.push();
        ctx.push();
        assert_eq!(ctx.depth(), 2);
        assert_eq!(ctx.columns(), 8);
        ctx.pop().unwrap();
        ctx.pop().unwrap();
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_pop_without_push_fails() {
        let mut ctx = IndentContext::default();
        let err = ctx.pop().unwrap_err();
        assert!(matches!(*err, Error::IndentationBalance));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_prefix_uses_width() {
        let mut ctx = IndentContext::new(2);
        ctx.push();
        assert_eq!(ctx.prefix(), "  ");
    }
}
