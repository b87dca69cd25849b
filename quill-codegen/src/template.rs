//! Keyed `%(key)s` placeholder substitution with column propagation.
//!
//! A multi-line replacement is reindented to the column its placeholder
//! starts at, so a fragment dropped into a template body lines up with the
//! surrounding code. The first line goes in place and inherits whatever
//! precedes the placeholder. Replacement text is never scanned again.
//!
//! `%%(` in a template produces a literal `%(`.

use crate::text::{IndentNormalizer, strip_columns};

/// One lexed template piece.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Placeholder { key: &'a str, raw: &'a str },
}

/// Substitutes keyed placeholders into templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSubstitutor {
    normalizer: IndentNormalizer,
}

impl TemplateSubstitutor {
    /// Create a substitutor that reindents replacements with `normalizer`.
    pub fn new(normalizer: IndentNormalizer) -> Self {
        Self { normalizer }
    }

    /// Substitute every placeholder whose key has a value.
    ///
    /// Unknown keys stay in the output untouched.
    pub fn substitute(&self, template: &str, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(template.len());

        for piece in lex(template) {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Placeholder { key, raw } => {
                    match values.iter().find(|(k, _)| *k == key) {
                        Some((_, value)) => {
                            let column = current_column(&out);
                            out.push_str(&self.place(value, column));
                        }
                        None => out.push_str(raw),
                    }
                }
            }
        }
        out
    }

    fn place(&self, value: &str, column: usize) -> String {
        if !value.contains('\n') {
            return value.trim().to_string();
        }
        let indented = self.normalizer.reindent(value, column);
        match indented.split_once('\n') {
            Some((first, rest)) => format!("{}\n{}", strip_columns(first, column), rest),
            None => strip_columns(&indented, column).to_string(),
        }
    }
}

/// Substitute with the default normalizer.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    TemplateSubstitutor::default().substitute(template, values)
}

/// Characters since the last newline.
fn current_column(out: &str) -> usize {
    match out.rfind('\n') {
        Some(pos) => out[pos + 1..].chars().count(),
        None => out.chars().count(),
    }
}

/// Split a template into literal spans and placeholders in one pass.
fn lex(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        // `%%(` escapes to `%(`
        if bytes[i..].starts_with(b"%%(") {
            push_literal(&mut pieces, &template[literal_start..i + 1]);
            i += 2;
            literal_start = i;
            continue;
        }
        if let Some(len) = placeholder_len(&bytes[i..]) {
            push_literal(&mut pieces, &template[literal_start..i]);
            let raw = &template[i..i + len];
            pieces.push(Piece::Placeholder {
                key: &raw[2..len - 2],
                raw,
            });
            i += len;
            literal_start = i;
            continue;
        }
        i += 1;
    }
    push_literal(&mut pieces, &template[literal_start..]);
    pieces
}

/// Length of a `%(key)s` placeholder at the start of `bytes`.
fn placeholder_len(bytes: &[u8]) -> Option<usize> {
    if !bytes.starts_with(b"%(") {
        return None;
    }
    let key_len = bytes[2..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    let close = 2 + key_len;
    (key_len > 0 && bytes[close..].starts_with(b")s")).then_some(close + 2)
}

fn push_literal<'a>(pieces: &mut Vec<Piece<'a>>, text: &'a str) {
    if !text.is_empty() {
        pieces.push(Piece::Literal(text));
    }
}
