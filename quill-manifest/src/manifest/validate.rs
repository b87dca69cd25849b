//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use miette::SourceSpan;
use quill_core::{is_c_identifier, is_cpp_keyword};

use crate::{Result, error::SourceContext};

/// Parsing and validation context that carries source information.
///
/// This struct encapsulates the source content, filename, and current path
/// through the manifest hierarchy. Pushing a segment also moves the span
/// search position past that record, so that a method name shared by two
/// classes is reported inside the right class.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "quill.toml");
/// ctx.validate_name("Abel", "class")?;
///
/// let class_ctx = ctx.push("Abel");
/// class_ctx.validate_symbol("__init__", "method")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Path segments for nested validation (e.g., ["Abel", "__init__"])
    path: Vec<&'a str>,
    /// Byte offset where span searches start
    from: usize,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
            from: 0,
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        let from = self
            .find_span(segment)
            .map(|span| span.offset() + span.len())
            .unwrap_or(self.from);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
            from,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Get a context description for error messages.
    ///
    /// For example: "method in 'Abel'" or just "class" if no path.
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    /// Find the span of a name in the source, starting at the current record.
    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        find_name_span(self.source.src(), name, self.from)
    }

    /// Validate a name that may appear bare in generated code.
    ///
    /// Checks for reserved keywords and valid identifier format.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if is_cpp_keyword(name) {
            return Err(self.source.reserved_keyword_error(
                name,
                self.context_for(kind),
                self.find_span(name),
            ));
        }
        self.validate_symbol(name, kind)
    }

    /// Validate a name that only appears inside prefixed generated symbols.
    pub fn validate_symbol(&self, name: &str, kind: &str) -> Result<()> {
        if !is_c_identifier(name) {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                self.find_span(name),
            ));
        }
        Ok(())
    }

    /// Create a validation error pointing at `name` when it can be located.
    pub fn error_at(&self, name: &str, message: impl Into<String>) -> Box<crate::Error> {
        self.source
            .validation_error(message, self.find_span(name))
    }
}

/// Find the span of a record name in the TOML source
///
/// Searches for `name = "value"` (with or without spaces, either quote style)
/// at or after byte offset `from`.
pub(crate) fn find_name_span(src: &str, name: &str, from: usize) -> Option<SourceSpan> {
    let haystack = src.get(from..)?;
    let patterns = [
        format!("name = \"{}\"", name),
        format!("name = '{}'", name),
        format!("name=\"{}\"", name),
        format!("name='{}'", name),
    ];

    patterns
        .iter()
        .filter_map(|pattern| {
            haystack
                .find(pattern.as_str())
                .map(|pos| (pos, pattern.len() - name.len() - 1))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(pos, skip)| SourceSpan::from((from + pos + skip, name.len())))
}
