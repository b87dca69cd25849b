//! Parse phase - extracts fragments and builds the entity graph.

use quill_manifest::{FunctionRecord, Manifest, PropertyRecord};

use crate::{
    EntityGraph, Result,
    annotation::{Annotation, AnnotationParser, Subject},
    entity::{Class, ClassId, EntityKind, Function, Module, Property, Signature, SourcePosition},
    pipeline::{CompilationContext, Diagnostic, Phase},
};

const PHASE: &str = "parse";

/// Phase that parses every documentation string into fragments.
pub struct ParsePhase;

impl Phase for ParsePhase {
    fn name(&self) -> &'static str {
        PHASE
    }

    fn description(&self) -> &'static str {
        "Extract fragments from documentation and build the entity graph"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let (graph, diagnostics) = build_graph(&ctx.manifest)?;
        tracing::debug!(
            functions = graph.functions().count(),
            classes = graph.class_count(),
            "entity graph built"
        );
        ctx.diagnostics.extend(diagnostics);
        ctx.graph = Some(graph);
        Ok(())
    }
}

/// Build the (not yet finalized) entity graph from discovery records.
///
/// Dropped duplicate fragments are reported as warnings.
///
/// # Errors
///
/// Fails on an unsupported fragment key or a duplicate entity name.
pub fn build_graph(manifest: &Manifest) -> Result<(EntityGraph, Vec<Diagnostic>)> {
    let builder = GraphBuilder {
        parser: AnnotationParser::new(&manifest.generator.marker),
        file: manifest.module.file_name(),
        diagnostics: Vec::new(),
    };
    builder.build(manifest)
}

struct GraphBuilder<'m> {
    parser: AnnotationParser<'m>,
    file: String,
    diagnostics: Vec<Diagnostic>,
}

impl GraphBuilder<'_> {
    fn build(mut self, manifest: &Manifest) -> Result<(EntityGraph, Vec<Diagnostic>)> {
        let record = &manifest.module;
        let position = SourcePosition::new(self.file.clone(), None);
        let annotation = self.annotate(&record.name, EntityKind::Module, &record.doc, &position)?;
        let mut graph = EntityGraph::new(Module {
            name: record.name.clone(),
            doc: record.doc.clone(),
            description: annotation.description,
            fragments: annotation.fragments,
            position,
        });

        for function in &manifest.functions {
            let function = self.function(function, None, None)?;
            graph.add_function(function)?;
        }

        for class in &manifest.classes {
            let id = graph.next_class_id();
            let position = self.position(class.line);
            let annotation = self.annotate(&class.name, EntityKind::Class, &class.doc, &position)?;

            let methods = class
                .methods
                .iter()
                .map(|method| self.function(method, Some(&class.name), Some(id)))
                .collect::<Result<Vec<_>>>()?;
            let properties = class
                .properties
                .iter()
                .map(|property| self.property(property, &class.name, id))
                .collect::<Result<Vec<_>>>()?;

            graph.add_class(Class {
                name: class.name.clone(),
                doc: class.doc.clone(),
                description: annotation.description,
                fragments: annotation.fragments,
                position,
                base_names: class.bases.clone(),
                bases: Vec::new(),
                lineage: Vec::new(),
                methods,
                properties,
                included: false,
            })?;
        }

        Ok((graph, self.diagnostics))
    }

    fn function(
        &mut self,
        record: &FunctionRecord,
        class: Option<&str>,
        owner: Option<ClassId>,
    ) -> Result<Function> {
        let qualified_name = qualify(class, &record.name);
        let position = self.position(record.line);
        let annotation =
            self.annotate(&qualified_name, EntityKind::Function, &record.doc, &position)?;

        Ok(Function {
            name: record.name.clone(),
            qualified_name,
            doc: record.doc.clone(),
            description: annotation.description,
            fragments: annotation.fragments,
            position,
            signature: Signature {
                params: record.params,
                varargs: record.varargs,
                kwargs: record.kwargs,
            },
            owner,
            inherited_from: None,
            included: false,
        })
    }

    fn property(&mut self, record: &PropertyRecord, class: &str, owner: ClassId) -> Result<Property> {
        let qualified_name = qualify(Some(class), &record.name);
        let position = self.position(record.line);
        let annotation =
            self.annotate(&qualified_name, EntityKind::Property, &record.doc, &position)?;

        Ok(Property {
            name: record.name.clone(),
            qualified_name,
            doc: record.doc.clone(),
            description: annotation.description,
            fragments: annotation.fragments,
            position,
            has_setter: record.setter,
            owner,
            inherited_from: None,
            included: false,
        })
    }

    fn position(&self, line: Option<u32>) -> SourcePosition {
        SourcePosition::new(self.file.clone(), line)
    }

    fn annotate(
        &mut self,
        name: &str,
        kind: EntityKind,
        doc: &str,
        position: &SourcePosition,
    ) -> Result<Annotation> {
        let subject = Subject {
            name,
            kind,
            position,
        };
        let annotation = self.parser.parse(doc, &subject)?;
        for duplicate in &annotation.duplicates {
            self.diagnostics.push(
                Diagnostic::warning(
                    PHASE,
                    format!(
                        "{} '{}' repeats the {} fragment, the first one is kept",
                        kind, name, duplicate.key
                    ),
                )
                .at(name),
            );
        }
        Ok(annotation)
    }
}

fn qualify(class: Option<&str>, name: &str) -> String {
    match class {
        Some(class) => format!("{class}.{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{Error, annotation::FragmentKey};

    fn manifest(content: &str) -> Manifest {
        Manifest::from_str(content).expect("Failed to parse test manifest")
    }

    #[test]
    fn test_build_graph() {
        let manifest = manifest(
            r#"
            [module]
            name = "example"
            doc = "Example module.\n_CPP_(HEADER): #include <string>"

            [[functions]]
            name = "answer"
            line = 4
            doc = "_CPP_: return toPython(42);"

            [[classes]]
            name = "Abel"
            line = 10
            doc = "An example.\n_CPP_: long justice;"

            [[classes.methods]]
            name = "get"
            params = 1
            line = 14
            doc = "_CPP_: return toPython(self->justice);"

            [[classes.properties]]
            name = "wisdom"
            setter = true
            doc = "_CPP_: return toPython(23);"
        "#,
        );

        let (graph, diagnostics) = build_graph(&manifest).unwrap();
        assert!(diagnostics.is_empty());
        assert!(!graph.is_finalized());

        let module = graph.module();
        assert_eq!(module.description, "Example module.");
        assert_eq!(
            module.fragment(FragmentKey::Header).unwrap().body,
            "#include <string>"
        );

        let answer = graph.function("answer").unwrap();
        assert_eq!(answer.position.to_string(), "example.py:4");
        assert!(!answer.is_method());

        let id = graph.class_id("Abel").unwrap();
        let abel = graph.class(id);
        assert_eq!(abel.description, "An example.");
        let get = abel.method("get").unwrap();
        assert_eq!(get.qualified_name, "Abel.get");
        assert_eq!(get.owner, Some(id));
        assert_eq!(get.signature.params, 1);
        let wisdom = abel.property("wisdom").unwrap();
        assert!(wisdom.has_setter);
        assert_eq!(wisdom.owner, id);
        assert!(wisdom.getter().is_some());
    }

    #[test]
    fn test_duplicate_fragment_warns() {
        let manifest = manifest(
            r#"
            [module]
            name = "example"

            [[functions]]
            name = "f"
            doc = "_CPP_: one;\n_CPP_: two;"
        "#,
        );

        let (graph, diagnostics) = build_graph(&manifest).unwrap();
        assert_eq!(graph.function("f").unwrap().body().unwrap().body, "one;");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].severity.is_warning());
        assert_eq!(diagnostics[0].location.as_deref(), Some("f"));
    }

    #[test]
    fn test_unsupported_key_fails() {
        let manifest = manifest(
            r#"
            [module]
            name = "example"

            [[classes]]
            name = "A"

            [[classes.methods]]
            name = "m"
            params = 1
            doc = "_CPP_(NEW): x;"
        "#,
        );

        let err = build_graph(&manifest).unwrap_err();
        assert!(matches!(*err, Error::Configuration { ref entity, .. } if entity == "A.m"));
    }

    #[test]
    fn test_parse_phase_sets_graph() {
        let mut ctx = CompilationContext::new(manifest("[module]\nname = \"m\""));
        ParsePhase.run(&mut ctx).unwrap();
        assert!(ctx.require_graph("test").is_ok());
    }
}
