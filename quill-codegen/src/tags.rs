//! `$TAG(args)` references inside fragments.
//!
//! A fragment is lexed once into literal text and tag tokens, then every tag
//! is resolved against the finalized [`EntityGraph`]. Expansion output is
//! never lexed again.
//!
//! `$$` produces a literal `$`. A `$` that is not followed by an identifier
//! and an opening parenthesis is plain text.

use std::{fmt, ops::Range};

use miette::{NamedSource, SourceSpan};

use crate::{
    EntityGraph, Error, IndentNormalizer, Result,
    annotation::FragmentKey,
    entity::{ClassId, SourcePosition},
    naming::{ClassSymbols, Naming},
    text::trim_blank_edges,
};

/// The recognised tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Name,
    Struct,
    TypeStruct,
    New,
    Copy,
    IsInstance,
    Cast,
}

impl TagKind {
    pub const ALL: [TagKind; 7] = [
        Self::Name,
        Self::Struct,
        Self::TypeStruct,
        Self::New,
        Self::Copy,
        Self::IsInstance,
        Self::Cast,
    ];

    /// Match a tag name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Struct => "STRUCT",
            Self::TypeStruct => "TYPE_STRUCT",
            Self::New => "NEW",
            Self::Copy => "COPY",
            Self::IsInstance => "IS_INSTANCE",
            Self::Cast => "CAST",
        }
    }

    /// Whether the tag applies to an object given as its first argument.
    pub fn takes_object(&self) -> bool {
        matches!(self, Self::Copy | Self::IsInstance | Self::Cast)
    }

    /// Accepted argument counts, as `(min, max)`.
    pub fn arity(&self) -> (usize, usize) {
        if self.takes_object() { (1, 2) } else { (0, 1) }
    }

    fn expand(&self, symbols: &ClassSymbols, object: Option<&str>) -> String {
        let object = object.unwrap_or_default();
        match self {
            Self::Name => symbols.name().to_string(),
            Self::Struct => symbols.instance_struct(),
            Self::TypeStruct => symbols.type_struct(),
            Self::New => symbols.new_expr(),
            Self::Copy => symbols.copy_expr(object),
            Self::IsInstance => symbols.is_instance_expr(object),
            Self::Cast => symbols.cast_expr(object),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.as_str())
    }
}

/// A lexed piece of fragment text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Tag(TagToken<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagToken<'a> {
    name: &'a str,
    args: Vec<&'a str>,
    /// From the `$` through the closing `)`
    span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Unterminated<'a> {
    name: &'a str,
    span: Range<usize>,
}

/// Where a fragment came from, for default-class lookup and error context.
#[derive(Debug, Clone, Copy)]
pub struct FragmentSite<'a> {
    /// Qualified name of the entity rendering the fragment
    pub entity: &'a str,
    pub key: FragmentKey,
    pub position: &'a SourcePosition,
    /// Documentation text the fragment was extracted from
    pub doc: &'a str,
    /// Byte offset of the fragment body in `doc`
    pub offset: usize,
    /// Class that argument-less tags refer to
    pub class: Option<ClassId>,
}

impl<'a> FragmentSite<'a> {
    fn source(&self) -> NamedSource<String> {
        NamedSource::new(
            format!("{} ({})", self.position, self.entity),
            self.doc.to_string(),
        )
    }

    /// Span of `range` (relative to the body) in the documentation text.
    fn span(&self, range: &Range<usize>) -> Option<SourceSpan> {
        let start = self.offset + range.start;
        let end = self.offset + range.end;
        (end <= self.doc.len()).then(|| SourceSpan::from(start..end))
    }
}

/// Resolves tags in fragments against an entity graph.
#[derive(Debug, Clone, Copy)]
pub struct TagResolver<'g> {
    graph: &'g EntityGraph,
    naming: Naming<'g>,
    normalizer: IndentNormalizer,
}

impl<'g> TagResolver<'g> {
    pub fn new(graph: &'g EntityGraph, prefix: &'g str) -> Self {
        Self {
            graph,
            naming: Naming::new(prefix),
            normalizer: IndentNormalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: IndentNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Substitute every tag in `text`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownTag`] for an unrecognised tag name and
    /// [`Error::UnresolvedReference`] for a missing class, a wrong argument
    /// count, an empty argument or an unterminated argument list.
    pub fn expand(&self, text: &str, site: &FragmentSite<'_>) -> Result<String> {
        let tokens = lex(text).map_err(|unterminated| {
            self.unresolved(
                site,
                unterminated.name,
                &format!("${}", unterminated.name),
                "unterminated argument list",
                &unterminated.span,
            )
        })?;

        let mut out = String::with_capacity(text.len());
        for token in tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Tag(tag) => out.push_str(&self.expand_tag(&tag, site)?),
            }
        }
        Ok(out)
    }

    /// Expand `text`, trim its blank edges and reindent it to `columns`.
    pub fn resolve(&self, text: &str, site: &FragmentSite<'_>, columns: usize) -> Result<String> {
        let expanded = self.expand(text, site)?;
        Ok(self
            .normalizer
            .reindent(&trim_blank_edges(&expanded), columns))
    }

    fn expand_tag(&self, tag: &TagToken<'_>, site: &FragmentSite<'_>) -> Result<String> {
        let Some(kind) = TagKind::parse(tag.name) else {
            return Err(Box::new(Error::UnknownTag {
                tag: tag.name.to_string(),
                entity: site.entity.to_string(),
                key: site.key.to_string(),
                position: site.position.to_string(),
                src: site.source(),
                span: site.span(&tag.span),
            }));
        };
        let tag_label = kind.to_string();

        let (min, max) = kind.arity();
        let count = tag.args.len();
        if count < min || count > max {
            let reason = if min == max {
                format!("expected {min} argument(s), got {count}")
            } else {
                format!("expected {min} to {max} arguments, got {count}")
            };
            return Err(self.unresolved(site, &tag.args.join(", "), &tag_label, &reason, &tag.span));
        }
        if let Some(index) = tag.args.iter().position(|arg| arg.is_empty()) {
            let reason = format!("argument {} is empty", index + 1);
            return Err(self.unresolved(site, &tag.args.join(", "), &tag_label, &reason, &tag.span));
        }

        let (object, class_arg) = if kind.takes_object() {
            (tag.args.first().copied(), tag.args.get(1).copied())
        } else {
            (None, tag.args.first().copied())
        };

        let class = match class_arg {
            Some(name) => self.graph.lookup_class(name).ok_or_else(|| {
                self.unresolved(site, name, &tag_label, "no exported class with this name", &tag.span)
            })?,
            None => site.class.ok_or_else(|| {
                self.unresolved(
                    site,
                    "(default class)",
                    &tag_label,
                    "the fragment does not belong to a class, name one explicitly",
                    &tag.span,
                )
            })?,
        };

        let symbols = self.naming.class(&self.graph.class(class).name);
        Ok(kind.expand(&symbols, object))
    }

    fn unresolved(
        &self,
        site: &FragmentSite<'_>,
        name: &str,
        tag: &str,
        reason: &str,
        range: &Range<usize>,
    ) -> Box<Error> {
        Box::new(Error::UnresolvedReference {
            name: name.to_string(),
            tag: tag.to_string(),
            entity: site.entity.to_string(),
            key: site.key.to_string(),
            position: site.position.to_string(),
            reason: reason.to_string(),
            src: site.source(),
            span: site.span(range),
        })
    }
}

/// Split `text` into literal spans and tag tokens in one pass.
fn lex(text: &str) -> std::result::Result<Vec<Token<'_>>, Unterminated<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'$') {
            push_text(&mut tokens, &text[literal_start..i + 1]);
            i += 2;
            literal_start = i;
            continue;
        }

        let name_len = identifier_len(&bytes[i + 1..]);
        let open = i + 1 + name_len;
        if name_len == 0 || bytes.get(open) != Some(&b'(') {
            i += 1;
            continue;
        }

        let name = &text[i + 1..open];
        let Some(close) = matching_paren(bytes, open) else {
            return Err(Unterminated {
                name,
                span: i..text.len(),
            });
        };

        push_text(&mut tokens, &text[literal_start..i]);
        tokens.push(Token::Tag(TagToken {
            name,
            args: split_args(&text[open + 1..close]),
            span: i..close + 1,
        }));
        i = close + 1;
        literal_start = i;
    }
    push_text(&mut tokens, &text[literal_start..]);
    Ok(tokens)
}

fn identifier_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
        _ => 0,
    }
}

/// Index of the `)` closing the `(` at `open`.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, b) in bytes[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas at nesting depth zero; `()` has no arguments.
fn split_args(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    args
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use quill_manifest::Manifest;

    use super::*;
    use crate::{FinalizeOptions, pipeline::phases::build_graph};

    fn graph() -> EntityGraph {
        let manifest = Manifest::from_str(
            r#"
[module]
name = "example"

[[classes]]
name = "X"
doc = "_CPP_: int value;"

[[classes]]
name = "Hidden"
doc = "No fragments here."
"#,
        )
        .unwrap();
        let (mut graph, _) = build_graph(&manifest).unwrap();
        graph.finalize(&FinalizeOptions::default()).unwrap();
        graph
    }

    fn site<'a>(graph: &EntityGraph, position: &'a SourcePosition, doc: &'a str) -> FragmentSite<'a> {
        FragmentSite {
            entity: "X.method",
            key: FragmentKey::Default,
            position,
            doc,
            offset: 0,
            class: graph.class_id("X"),
        }
    }

    fn expand(text: &str) -> Result<String> {
        let graph = graph();
        let position = SourcePosition::new("example.py", Some(3));
        TagResolver::new(&graph, "quill").expand(text, &site(&graph, &position, text))
    }

    #[test]
    fn test_lex_tokens() {
        let tokens = lex("a $NEW() b").unwrap();
        assert_eq!(
            tokens,
            [
                Token::Text("a "),
                Token::Tag(TagToken {
                    name: "NEW",
                    args: vec![],
                    span: 2..8
                }),
                Token::Text(" b"),
            ]
        );
    }

    #[test]
    fn test_lex_nested_args() {
        let tokens = lex("$CAST(f(a, b), X)").unwrap();
        match &tokens[0] {
            Token::Tag(tag) => assert_eq!(tag.args, ["f(a, b)", "X"]),
            other => panic!("expected a tag, got {other:?}"),
        }
    }

    #[test]
    fn test_lex_unterminated() {
        let err = lex("x = $CAST(arg1;").unwrap_err();
        assert_eq!(err.name, "CAST");
        assert_eq!(err.span, 4..15);
    }

    #[test]
    fn test_expansions() {
        assert_eq!(expand("$NAME()").unwrap(), "X");
        assert_eq!(expand("$STRUCT()").unwrap(), "X_struct");
        assert_eq!(expand("$TYPE_STRUCT(X)").unwrap(), "X_type_struct");
        assert_eq!(
            expand("return $NEW();").unwrap(),
            "return reinterpret_cast<X_struct*>(quill_new_X(&X_type_struct, NULL, NULL));"
        );
        assert_eq!(
            expand("$COPY(self)").unwrap(),
            "quill_copy_X(reinterpret_cast<X_struct*>(self))"
        );
        assert_eq!(
            expand("$IS_INSTANCE(arg1, X)").unwrap(),
            "PyObject_TypeCheck(reinterpret_cast<PyObject*>(arg1), &X_type_struct)"
        );
        assert_eq!(expand("$CAST(arg1)->value").unwrap(), "reinterpret_cast<X_struct*>(arg1)->value");
    }

    #[test]
    fn test_tag_names_case_insensitive() {
        assert_eq!(expand("$is_instance(o)").unwrap(), expand("$IS_INSTANCE(o)").unwrap());
    }

    #[test]
    fn test_new_is_referentially_transparent() {
        assert_eq!(expand("$NEW(X)").unwrap(), expand("$NEW(X)").unwrap());
    }

    #[test]
    fn test_undeclared_class() {
        let err = expand("$NEW(Y)").unwrap_err();
        match *err {
            Error::UnresolvedReference {
                ref name,
                ref tag,
                ref entity,
                span,
                ..
            } => {
                assert_eq!(name, "Y");
                assert_eq!(tag, "$NEW");
                assert_eq!(entity, "X.method");
                assert_eq!(span, Some(SourceSpan::from(0..7)));
            }
            ref other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_excluded_class_is_not_visible() {
        let err = expand("$STRUCT(Hidden)").unwrap_err();
        assert!(matches!(*err, Error::UnresolvedReference { ref name, .. } if name == "Hidden"));
    }

    #[test]
    fn test_unknown_tag() {
        let err = expand("$BOGUS(x)").unwrap_err();
        assert!(matches!(*err, Error::UnknownTag { ref tag, .. } if tag == "BOGUS"));
    }

    #[test]
    fn test_wrong_arity() {
        let err = expand("$CAST()").unwrap_err();
        assert!(matches!(*err, Error::UnresolvedReference { ref reason, .. } if reason.contains("got 0")));
        let err = expand("$NAME(X, X)").unwrap_err();
        assert!(matches!(*err, Error::UnresolvedReference { ref reason, .. } if reason.contains("got 2")));
    }

    #[test]
    fn test_empty_argument() {
        let err = expand("x = $CAST( , X);").unwrap_err();
        match *err {
            Error::UnresolvedReference {
                ref reason, span, ..
            } => {
                assert_eq!(reason, "argument 1 is empty");
                assert_eq!(span, Some(SourceSpan::from(4..15)));
            }
            ref other => panic!("unexpected error: {other:?}"),
        }
        let err = expand("$IS_INSTANCE(self, )").unwrap_err();
        assert!(matches!(*err, Error::UnresolvedReference { ref reason, .. } if reason == "argument 2 is empty"));
    }

    #[test]
    fn test_unterminated_is_unresolved() {
        let err = expand("$NEW(X").unwrap_err();
        assert!(matches!(
            *err,
            Error::UnresolvedReference { ref reason, .. } if reason == "unterminated argument list"
        ));
    }

    #[test]
    fn test_literal_dollars() {
        assert_eq!(expand("cost: $$5").unwrap(), "cost: $5");
        assert_eq!(expand("$$NAME()").unwrap(), "$NAME()");
        assert_eq!(expand("a $ b $x c").unwrap(), "a $ b $x c");
    }

    #[test]
    fn test_expansion_not_rescanned() {
        assert_eq!(expand("$CAST($NAME())").unwrap(), "reinterpret_cast<X_struct*>($NAME())");
    }

    #[test]
    fn test_no_default_class() {
        let graph = graph();
        let position = SourcePosition::new("example.py", None);
        let mut site = site(&graph, &position, "");
        site.class = None;
        let err = TagResolver::new(&graph, "quill")
            .expand("$NEW()", &site)
            .unwrap_err();
        assert!(matches!(*err, Error::UnresolvedReference { span: None, .. }));
    }

    #[test]
    fn test_resolve_reindents() {
        let graph = graph();
        let position = SourcePosition::new("example.py", None);
        let text = "\n        $STRUCT()* s = $CAST(arg1);\n        return 0;\n";
        let resolved = TagResolver::new(&graph, "quill")
            .resolve(text, &site(&graph, &position, text), 4)
            .unwrap();
        assert_eq!(
            resolved,
            "    X_struct* s = reinterpret_cast<X_struct*>(arg1);\n    return 0;"
        );
    }
}
