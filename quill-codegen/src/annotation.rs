//! Splitting documentation text into a description and keyed fragments.

use std::{fmt, ops::Range};

use indexmap::IndexMap;
use miette::{NamedSource, SourceSpan};
use serde::Serialize;

use crate::{
    Error, Result,
    entity::{EntityKind, SourcePosition},
    text::{blank_edge_range, is_blank},
};

/// Key of a fragment within one documentation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FragmentKey {
    /// Unkeyed marker
    Default,
    Header,
    New,
    Free,
    Copy,
    Get,
    Set,
}

impl FragmentKey {
    /// Parse a marker key word (case-insensitive).
    pub fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "" => Some(Self::Default),
            "HEADER" => Some(Self::Header),
            "NEW" => Some(Self::New),
            "FREE" => Some(Self::Free),
            "COPY" => Some(Self::Copy),
            "GET" => Some(Self::Get),
            "SET" => Some(Self::Set),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Header => "HEADER",
            Self::New => "NEW",
            Self::Free => "FREE",
            Self::Copy => "COPY",
            Self::Get => "GET",
            Self::Set => "SET",
        }
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A code fragment extracted from documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub key: FragmentKey,
    /// Body with blank edges trimmed, inner indentation untouched
    pub body: String,
    /// Byte offset of `body` in the documentation text
    pub offset: usize,
    /// Byte range of the marker that introduced the fragment
    #[serde(skip)]
    pub marker: Range<usize>,
}

impl Fragment {
    /// Whether the body holds no code.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Fragments in documentation order, one per key.
pub type FragmentMap = IndexMap<FragmentKey, Fragment>;

/// Result of parsing one documentation string.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    /// Text before the first marker, trimmed
    pub description: String,
    pub fragments: FragmentMap,
    /// Fragments dropped because their key was already taken
    pub duplicates: Vec<Fragment>,
}

/// The entity a documentation string belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    /// Qualified name (`Class.method`)
    pub name: &'a str,
    pub kind: EntityKind,
    pub position: &'a SourcePosition,
}

impl Subject<'_> {
    /// Name used for the documentation text in rendered diagnostics.
    pub fn source_name(&self) -> String {
        format!("{} ({})", self.position, self.name)
    }
}

/// A marker found in the text.
struct Marker<'a> {
    range: Range<usize>,
    /// `None` for a bare `MARKER:`
    word: Option<&'a str>,
}

/// Parses `MARKER:` / `MARKER(KEY):` sections out of documentation text.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationParser<'a> {
    marker: &'a str,
}

impl<'a> AnnotationParser<'a> {
    pub fn new(marker: &'a str) -> Self {
        Self { marker }
    }

    /// Split `doc` into its description and fragments.
    ///
    /// The first fragment for a key wins; later ones are returned in
    /// [`Annotation::duplicates`].
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for a key the subject's kind does not support.
    pub fn parse(&self, doc: &str, subject: &Subject<'_>) -> Result<Annotation> {
        let markers = self.find_markers(doc);
        let Some(first) = markers.first() else {
            return Ok(Annotation {
                description: doc.trim().to_string(),
                ..Annotation::default()
            });
        };

        let mut annotation = Annotation {
            description: doc[..first.range.start].trim().to_string(),
            ..Annotation::default()
        };

        for (i, marker) in markers.iter().enumerate() {
            let body_end = markers
                .get(i + 1)
                .map(|next| next.range.start)
                .unwrap_or(doc.len());
            let key = self.resolve_key(doc, marker, &annotation.fragments, subject)?;
            let fragment = extract_body(doc, key, marker.range.clone(), body_end);

            if annotation.fragments.contains_key(&key) {
                tracing::warn!(
                    entity = subject.name,
                    key = %key,
                    "duplicate fragment dropped, the first one is kept"
                );
                annotation.duplicates.push(fragment);
            } else {
                annotation.fragments.insert(key, fragment);
            }
        }

        Ok(annotation)
    }

    fn find_markers<'d>(&self, doc: &'d str) -> Vec<Marker<'d>> {
        let mut markers = Vec::new();
        if self.marker.is_empty() {
            return markers;
        }
        let mut from = 0;
        while let Some(found) = doc[from..].find(self.marker) {
            let start = from + found;
            let after = start + self.marker.len();
            from = after;

            let rest = &doc[after..];
            if rest.starts_with(':') {
                markers.push(Marker {
                    range: start..after + 1,
                    word: None,
                });
            } else if let Some(inner) = rest.strip_prefix('(') {
                // any key word reaches resolve_key, so malformed keys are reported
                let word_len = inner
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();
                if inner[word_len..].starts_with("):") {
                    let end = after + 1 + word_len + 2;
                    markers.push(Marker {
                        range: start..end,
                        word: Some(&inner[..word_len]),
                    });
                    from = end;
                }
            }
        }
        markers
    }

    fn resolve_key(
        &self,
        doc: &str,
        marker: &Marker<'_>,
        taken: &FragmentMap,
        subject: &Subject<'_>,
    ) -> Result<FragmentKey> {
        let word = marker.word.unwrap_or("");
        if word.is_empty() {
            return Ok(subject.kind.bare_key(taken));
        }

        match FragmentKey::parse(word) {
            Some(key) if subject.kind.supports(key) => Ok(key),
            _ => Err(Box::new(Error::Configuration {
                entity: subject.name.to_string(),
                kind: subject.kind.label(),
                key: word.to_ascii_uppercase(),
                supported: subject.kind.supported_list(),
                position: subject.position.to_string(),
                src: NamedSource::new(subject.source_name(), doc.to_string()),
                span: Some(SourceSpan::from(marker.range.clone())),
            })),
        }
    }
}

impl Default for AnnotationParser<'static> {
    fn default() -> Self {
        Self::new("_CPP_")
    }
}

fn extract_body(doc: &str, key: FragmentKey, marker: Range<usize>, end: usize) -> Fragment {
    let mut start = marker.end;
    // code on the marker line starts right after the marker
    let first_line = doc[start..end].split('\n').next().unwrap_or("");
    if !is_blank(first_line) {
        start += first_line.len() - first_line.trim_start().len();
    }
    let raw = &doc[start..end];
    let range = blank_edge_range(raw);

    Fragment {
        key,
        body: raw[range.clone()].to_string(),
        offset: start + range.start,
        marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> SourcePosition {
        SourcePosition::new("example.py", Some(10))
    }

    fn parse(doc: &str, kind: EntityKind) -> Result<Annotation> {
        let position = position();
        let subject = Subject {
            name: "Abel",
            kind,
            position: &position,
        };
        AnnotationParser::default().parse(doc, &subject)
    }

    #[test]
    fn test_plain_description() {
        let annotation = parse("\n  Just words.\n", EntityKind::Class).unwrap();
        assert_eq!(annotation.description, "Just words.");
        assert!(annotation.fragments.is_empty());
    }

    #[test]
    fn test_class_fragments() {
        let doc = "An example\n\n_CPP_:\n    long justice;\n_CPP_(NEW):\n    justice = 23;\n_CPP_(free):\n    delete data;\n";
        let annotation = parse(doc, EntityKind::Class).unwrap();

        assert_eq!(annotation.description, "An example");
        let keys: Vec<_> = annotation.fragments.keys().copied().collect();
        assert_eq!(
            keys,
            [FragmentKey::Default, FragmentKey::New, FragmentKey::Free]
        );
        assert_eq!(annotation.fragments[&FragmentKey::Default].body, "    long justice;");
        assert_eq!(annotation.fragments[&FragmentKey::Free].body, "    delete data;");
    }

    #[test]
    fn test_fragment_offset_points_into_doc() {
        let doc = "Doc\n_CPP_:\n\n  return 1;\n";
        let annotation = parse(doc, EntityKind::Function).unwrap();
        let fragment = &annotation.fragments[&FragmentKey::Default];
        assert_eq!(&doc[fragment.offset..fragment.offset + fragment.body.len()], "  return 1;");
        assert_eq!(&doc[fragment.marker.clone()], "_CPP_:");
    }

    #[test]
    fn test_code_on_marker_line() {
        let annotation = parse("_CPP_: return toPython(1);", EntityKind::Function).unwrap();
        assert_eq!(annotation.description, "");
        assert_eq!(
            annotation.fragments[&FragmentKey::Default].body,
            "return toPython(1);"
        );
    }

    #[test]
    fn test_empty_parens_is_default_key() {
        let annotation = parse("_CPP_():\n x;", EntityKind::Function).unwrap();
        assert!(annotation.fragments.contains_key(&FragmentKey::Default));
    }

    #[test]
    fn test_unsupported_key_is_configuration_error() {
        let doc = "Doc\n_CPP_(SET):\n    x;";
        let err = parse(doc, EntityKind::Function).unwrap_err();
        match *err {
            Error::Configuration {
                ref entity,
                ref key,
                span,
                ..
            } => {
                assert_eq!(entity, "Abel");
                assert_eq!(key, "SET");
                assert_eq!(span, Some(SourceSpan::from(4..15)));
            }
            ref other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_key_word_is_configuration_error() {
        let err = parse("_CPP_(bogus):\n x;", EntityKind::Class).unwrap_err();
        assert!(matches!(*err, Error::Configuration { ref key, .. } if key == "BOGUS"));
    }

    #[test]
    fn test_malformed_key_word_is_configuration_error() {
        let err = parse("Doc\n_CPP_(NEW_X):\n x;", EntityKind::Class).unwrap_err();
        match *err {
            Error::Configuration { ref key, span, .. } => {
                assert_eq!(key, "NEW_X");
                assert_eq!(span, Some(SourceSpan::from(4..17)));
            }
            ref other => panic!("unexpected error: {other:?}"),
        }

        let err = parse("_CPP_:\n x;\n_CPP_(2):\n y;", EntityKind::Class).unwrap_err();
        assert!(matches!(*err, Error::Configuration { ref key, .. } if key == "2"));
    }

    #[test]
    fn test_duplicate_key_first_wins() {
        let doc = "_CPP_:\n first;\n_CPP_:\n second;";
        let annotation = parse(doc, EntityKind::Function).unwrap();
        assert_eq!(annotation.fragments[&FragmentKey::Default].body, " first;");
        assert_eq!(annotation.duplicates.len(), 1);
        assert_eq!(annotation.duplicates[0].body, " second;");
    }

    #[test]
    fn test_property_bare_markers() {
        let doc = "_CPP_: return get();\n_CPP_: set(arg1); return 0;";
        let annotation = parse(doc, EntityKind::Property).unwrap();
        assert_eq!(annotation.fragments[&FragmentKey::Get].body, "return get();");
        assert_eq!(
            annotation.fragments[&FragmentKey::Set].body,
            "set(arg1); return 0;"
        );
    }

    #[test]
    fn test_property_explicit_set() {
        let doc = "_CPP_:\n return x;\n_CPP_(SET):\n x = 1;";
        let annotation = parse(doc, EntityKind::Property).unwrap();
        assert_eq!(annotation.fragments.len(), 2);
        assert!(annotation.duplicates.is_empty());
    }

    #[test]
    fn test_marker_lookalikes_are_text() {
        let doc = "Mentions _CPP_ and _CPP_(x) in prose";
        let annotation = parse(doc, EntityKind::Class).unwrap();
        assert!(annotation.fragments.is_empty());
        assert_eq!(annotation.description, doc);
    }

    #[test]
    fn test_custom_marker() {
        let position = position();
        let subject = Subject {
            name: "f",
            kind: EntityKind::Function,
            position: &position,
        };
        let annotation = AnnotationParser::new("@c")
            .parse("Doc\n@c:\n  x;", &subject)
            .unwrap();
        assert_eq!(annotation.fragments[&FragmentKey::Default].body, "  x;");
    }
}
