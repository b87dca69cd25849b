//! Lint for fragments without code.

use quill_manifest::Manifest;

use super::super::Lint;
use crate::{
    annotation::{AnnotationParser, Subject},
    entity::{EntityKind, SourcePosition},
    pipeline::Diagnostic,
};

/// Lint that warns about markers followed by no code.
///
/// Docs that fail to parse are skipped; the parse phase reports them.
pub struct EmptyFragmentLint;

impl Lint for EmptyFragmentLint {
    fn name(&self) -> &'static str {
        "empty-fragment"
    }

    fn description(&self) -> &'static str {
        "Warn about fragment markers with an empty body"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        let parser = AnnotationParser::new(&manifest.generator.marker);
        let file = manifest.module.file_name();

        let mut docs = vec![(
            manifest.module.name.clone(),
            EntityKind::Module,
            &manifest.module.doc,
            None,
        )];
        for function in &manifest.functions {
            docs.push((
                function.name.clone(),
                EntityKind::Function,
                &function.doc,
                function.line,
            ));
        }
        for class in &manifest.classes {
            docs.push((class.name.clone(), EntityKind::Class, &class.doc, class.line));
            for method in &class.methods {
                docs.push((
                    format!("{}.{}", class.name, method.name),
                    EntityKind::Function,
                    &method.doc,
                    method.line,
                ));
            }
            for property in &class.properties {
                docs.push((
                    format!("{}.{}", class.name, property.name),
                    EntityKind::Property,
                    &property.doc,
                    property.line,
                ));
            }
        }

        for (name, kind, doc, line) in docs {
            let position = SourcePosition::new(file.clone(), line);
            let subject = Subject {
                name: &name,
                kind,
                position: &position,
            };
            let Ok(annotation) = parser.parse(doc, &subject) else {
                continue;
            };
            for fragment in annotation.fragments.values().filter(|f| f.is_empty()) {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        format!("{} '{}' has an empty {} fragment", kind, name, fragment.key),
                    )
                    .at(name.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn check(content: &str) -> Vec<Diagnostic> {
        let manifest = Manifest::from_str(content).expect("Failed to parse test manifest");
        let mut diagnostics = Vec::new();
        EmptyFragmentLint.check(&manifest, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_filled_fragments() {
        let diagnostics = check(
            r#"
            [module]
            name = "test"
            doc = "_CPP_(HEADER): #include <string>"

            [[functions]]
            name = "f"
            doc = "_CPP_: Py_RETURN_NONE;"
        "#,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_empty_member_fragment() {
        let diagnostics = check(
            r#"
            [module]
            name = "test"

            [[classes]]
            name = "A"
            doc = "_CPP_: int x;"

            [[classes.properties]]
            name = "x"
            doc = "_CPP_: return toPython(self->x);\n_CPP_(SET):\n   \n"
        "#,
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_warning());
        assert_eq!(diagnostics[0].location.as_deref(), Some("A.x"));
        assert!(diagnostics[0].message.contains("SET"));
    }

    #[test]
    fn test_bad_key_left_to_parse_phase() {
        let diagnostics = check(
            r#"
            [module]
            name = "test"

            [[functions]]
            name = "f"
            doc = "_CPP_(NEW):"
        "#,
        );
        assert!(diagnostics.is_empty());
    }
}
