//! Code builder utility for generating properly indented code.

use std::ops::{Deref, DerefMut};

use crate::{IndentContext, IndentNormalizer, Result};

/// Line-oriented buffer that tracks its own indent depth.
///
/// # Example
///
/// ```
/// use quill_codegen::CodeBuilder;
///
/// let mut builder = CodeBuilder::new(4);
/// builder
///     .block("int main()", "}", |b| {
///         b.push_line("return 0;");
///         Ok(())
///     })
///     .unwrap();
///
/// assert_eq!(builder.build(), "int main()\n{\n    return 0;\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent: IndentContext,
    normalizer: IndentNormalizer,
    buffer: String,
}

impl CodeBuilder {
    /// Create a new builder with `width` spaces per indent level.
    pub fn new(width: usize) -> Self {
        Self {
            indent: IndentContext::new(width),
            normalizer: IndentNormalizer::default(),
            buffer: String::new(),
        }
    }

    /// Use a specific normalizer for [`push_text`](Self::push_text).
    pub fn with_normalizer(mut self, normalizer: IndentNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Add a line of code with current indentation.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self.push_blank();
        }
        self.buffer.push_str(&self.indent.prefix());
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Add a blank line.
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Add raw text without indentation or newline.
    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    /// Add a block of text, reindented to the current depth.
    ///
    /// Empty text adds nothing and trailing blank lines are dropped.
    pub fn push_text(&mut self, text: &str) -> &mut Self {
        if text.trim().is_empty() {
            return self;
        }
        let text = self.normalizer.reindent(text, self.indent.columns());
        for line in text.trim_end_matches('\n').split('\n') {
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }
        self
    }

    /// Increase indentation level.
    pub fn push_indent(&mut self) -> &mut Self {
        self.indent.push();
        self
    }

    /// Decrease indentation level.
    ///
    /// # Errors
    ///
    /// Fails when there is no matching [`push_indent`](Self::push_indent).
    pub fn push_dedent(&mut self) -> Result<&mut Self> {
        self.indent.pop()?;
        Ok(self)
    }

    /// Add a brace block: `header`, `{`, the indented body, then `close`.
    pub fn block<F>(&mut self, header: &str, close: &str, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.push_line(header);
        self.push_line("{");
        self.push_indent();
        f(self)?;
        self.push_dedent()?;
        self.push_line(close);
        Ok(self)
    }

    /// Enter one indent level for the lifetime of the returned guard.
    pub fn indented(&mut self) -> Indented<'_> {
        self.indent.push();
        Indented { builder: self }
    }

    /// Current indentation in columns.
    pub fn columns(&self) -> usize {
        self.indent.columns()
    }

    /// Current indent depth.
    pub fn depth(&self) -> usize {
        self.indent.depth()
    }

    /// Consume the builder and return the generated code.
    pub fn build(self) -> String {
        self.buffer
    }

    /// Get a reference to the current buffer content.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new(crate::indent::DEFAULT_INDENT_WIDTH)
    }
}

/// Scoped indent level; dropping it pops the level it pushed.
pub struct Indented<'a> {
    builder: &'a mut CodeBuilder,
}

impl Deref for Indented<'_> {
    type Target = CodeBuilder;

    fn deref(&self) -> &CodeBuilder {
        self.builder
    }
}

impl DerefMut for Indented<'_> {
    fn deref_mut(&mut self) -> &mut CodeBuilder {
        self.builder
    }
}

impl Drop for Indented<'_> {
    fn drop(&mut self) {
        let popped = self.builder.indent.pop();
        debug_assert!(popped.is_ok(), "guard pop must match its push");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_basic_line() {
        let mut builder = CodeBuilder::default();
        builder.push_line("int x = 1;");
        assert_eq!(builder.build(), "int x = 1;\n");
    }

    #[test]
    fn test_indentation() {
        let mut builder = CodeBuilder::new(4);
        builder.push_line("if (x)").push_indent().push_line("return;");
        builder.push_dedent().unwrap().push_line("done();");
        assert_eq!(builder.build(), "if (x)\n    return;\ndone();\n");
    }

    #[test]
    fn test_block() {
        let mut builder = CodeBuilder::new(2);
        builder
            .block("struct A", "};", |b| {
                b.push_line("int x;");
                Ok(())
            })
            .unwrap();
        assert_eq!(builder.build(), "struct A\n{\n  int x;\n};\n");
    }

    #[test]
    fn test_block_error_propagates() {
        let mut builder = CodeBuilder::default();
        let result = builder.block("void f()", "}", |_| Err(Box::new(Error::IndentationBalance)));
        assert!(result.is_err());
    }

    #[test]
    fn test_dedent_without_indent_fails() {
        let mut builder = CodeBuilder::default();
        assert!(builder.push_dedent().is_err());
    }

    #[test]
    fn test_push_text_reindents() {
        let mut builder = CodeBuilder::new(4);
        builder.push_indent();
        builder.push_text("        a;\n          b;\n");
        assert_eq!(builder.build(), "    a;\n      b;\n");
    }

    #[test]
    fn test_push_text_skips_empty() {
        let mut builder = CodeBuilder::default();
        builder.push_text("  \n ");
        assert_eq!(builder.as_str(), "");
    }

    #[test]
    fn test_indented_guard_pops_on_drop() {
        let mut builder = CodeBuilder::new(4);
        {
            let mut inner = builder.indented();
            inner.push_line("x;");
            assert_eq!(inner.depth(), 1);
        }
        assert_eq!(builder.depth(), 0);
        builder.push_line("y;");
        assert_eq!(builder.build(), "    x;\ny;\n");
    }
}
