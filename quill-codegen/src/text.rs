//! Block reindenting and blank-edge trimming.
//!
//! Everything the generator emits passes through [`IndentNormalizer`], so the
//! output stays stable regardless of how a fragment was indented inside its
//! documentation string.

use std::ops::Range;

/// Default tab expansion width.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Reindents and trims blocks of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentNormalizer {
    tab_width: usize,
}

impl IndentNormalizer {
    /// Create a normalizer that expands tabs to `tab_width` columns.
    pub const fn new(tab_width: usize) -> Self {
        Self { tab_width }
    }

    /// The tab expansion width.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Move a block of text to `columns`.
    ///
    /// Tabs are expanded, the smallest indentation of all non-blank lines is
    /// removed and every non-blank line is prefixed with `columns` spaces.
    /// Blank lines are emitted empty and runs of them collapse into one.
    pub fn reindent(&self, text: &str, columns: usize) -> String {
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| expand_tabs(line, self.tab_width))
            .collect();

        let common = lines
            .iter()
            .filter(|line| !is_blank(line))
            .map(|line| leading_spaces(line))
            .min()
            .unwrap_or(0);

        let prefix = " ".repeat(columns);
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut previous_blank = false;

        for line in &lines {
            if is_blank(line) {
                if !previous_blank {
                    out.push(String::new());
                }
                previous_blank = true;
                continue;
            }
            previous_blank = false;
            out.push(format!("{}{}", prefix, line[common..].trim_end()));
        }

        out.join("\n")
    }
}

impl Default for IndentNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_WIDTH)
    }
}

/// Reindent `text` to `columns` with the default tab width.
pub fn reindent(text: &str, columns: usize) -> String {
    IndentNormalizer::default().reindent(text, columns)
}

/// Remove leading and trailing blank lines.
///
/// The indentation of the first retained line is kept; trailing whitespace at
/// the very end is stripped.
pub fn trim_blank_edges(text: &str) -> String {
    text[blank_edge_range(text)].to_string()
}

/// Byte range of `text` that [`trim_blank_edges`] keeps.
pub fn blank_edge_range(text: &str) -> Range<usize> {
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if !is_blank(line) {
            break;
        }
        start += line.len();
    }
    let end = start + text[start..].trim_end().len();
    start..end
}

/// Strip up to `columns` leading spaces from `line`.
pub fn strip_columns(line: &str, columns: usize) -> &str {
    let available = leading_spaces(line).min(columns);
    &line[available..]
}

/// Whether a line contains only whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let width = tab_width.max(1);
    let mut out = String::with_capacity(line.len() + width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = width - column % width;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindent_to_zero() {
        assert_eq!(reindent("bla\nblub", 0), "bla\nblub");
        assert_eq!(reindent("  bla\n  blub", 0), "bla\nblub");
        assert_eq!(reindent("  bla\n   blub", 0), "bla\n blub");
    }

    #[test]
    fn test_reindent_adds_prefix() {
        assert_eq!(reindent("bla\nblub", 1), " bla\n blub");
        assert_eq!(reindent(" bla\nblub", 2), "   bla\n  blub");
    }

    #[test]
    fn test_reindent_is_idempotent() {
        let samples = [
            "  bla\n   blub",
            "\tif (x)\n\t\treturn 1;\n",
            "a\n\n\n\n  b\n",
            "   \n  x\n \n\n y",
            "",
        ];
        for sample in samples {
            for columns in [0, 1, 4, 8] {
                let once = reindent(sample, columns);
                assert_eq!(reindent(&once, columns), once, "sample {:?}", sample);
            }
        }
    }

    #[test]
    fn test_reindent_collapses_blank_runs() {
        assert_eq!(reindent("a\n\n   \n\nb", 2), "  a\n\n  b");
    }

    #[test]
    fn test_reindent_expands_tabs() {
        assert_eq!(reindent("\tx\n\t\ty", 0), "x\n    y");
        assert_eq!(IndentNormalizer::new(2).reindent("\tx\n\t\ty", 0), "x\n  y");
    }

    #[test]
    fn test_trim_blank_edges() {
        assert_eq!(trim_blank_edges("\nbla\nblub\n"), "bla\nblub");
        assert_eq!(trim_blank_edges("  \nbla\nblub  \n  "), "bla\nblub");
        assert_eq!(trim_blank_edges("\n  bla\n  blub\n"), "  bla\n  blub");
        assert_eq!(trim_blank_edges(" \n \n"), "");
    }

    #[test]
    fn test_blank_edge_range_offsets() {
        let text = "\n\n    body;\n";
        let range = blank_edge_range(text);
        assert_eq!(range, 2..11);
        assert_eq!(&text[range], "    body;");
    }

    #[test]
    fn test_strip_columns() {
        assert_eq!(strip_columns("    x", 2), "  x");
        assert_eq!(strip_columns(" x", 4), "x");
    }
}
