//! One-time finalize step: base resolution, member inheritance, inclusion.

use std::collections::HashSet;

use miette::NamedSource;

use super::{ClassId, EntityGraph, EntityKind, Function, Property};
use crate::{Error, Result, annotation::FragmentKey, pipeline::Diagnostic};

/// Name of the implicit root type, never emitted.
const ROOT_TYPE: &str = "object";

const PHASE: &str = "finalize";

/// Options controlling [`EntityGraph::finalize`].
#[derive(Debug, Clone, Copy)]
pub struct FinalizeOptions {
    /// Copy base methods and properties into derived classes
    pub inherit_members: bool,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            inherit_members: true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

impl EntityGraph {
    /// Resolve bases, copy inherited members and decide what gets exported.
    ///
    /// Returns the diagnostics it produced; fatal problems are errors.
    pub fn finalize(&mut self, options: &FinalizeOptions) -> Result<Vec<Diagnostic>> {
        self.resolve_bases()?;
        self.resolve_lineages()?;
        if options.inherit_members {
            self.inherit_members();
        }
        let diagnostics = self.mark_included();
        self.set_finalized();
        Ok(diagnostics)
    }

    fn resolve_bases(&mut self) -> Result<()> {
        for index in 0..self.class_count() {
            let id = ClassId(index);
            let class = self.class(id);
            let mut bases = Vec::with_capacity(class.base_names.len());

            for base in &class.base_names {
                if base == ROOT_TYPE {
                    continue;
                }
                match self.class_id(base) {
                    Some(base_id) => bases.push(base_id),
                    None => {
                        return Err(self.base_error(id, base, "no class with this name was discovered"));
                    }
                }
            }
            self.class_mut(id).bases = bases;
        }
        Ok(())
    }

    fn resolve_lineages(&mut self) -> Result<()> {
        let count = self.class_count();
        let mut state = vec![Visit::New; count];
        let mut lineages: Vec<Vec<ClassId>> = vec![Vec::new(); count];

        for index in 0..count {
            self.visit(ClassId(index), &mut state, &mut lineages)?;
        }
        for (index, lineage) in lineages.into_iter().enumerate() {
            self.class_mut(ClassId(index)).lineage = lineage;
        }
        Ok(())
    }

    fn visit(
        &self,
        id: ClassId,
        state: &mut [Visit],
        lineages: &mut [Vec<ClassId>],
    ) -> Result<()> {
        match state[id.0] {
            Visit::Done => return Ok(()),
            Visit::Active => {
                let name = self.class(id).name.clone();
                return Err(self.base_error(id, &name, "cyclic inheritance"));
            }
            Visit::New => {}
        }
        state[id.0] = Visit::Active;

        let mut lineage = Vec::new();
        for base in &self.class(id).bases {
            self.visit(*base, state, lineages)?;
            for ancestor in &lineages[base.0] {
                if !lineage.contains(ancestor) {
                    lineage.push(*ancestor);
                }
            }
        }
        lineage.push(id);

        lineages[id.0] = lineage;
        state[id.0] = Visit::Done;
        Ok(())
    }

    /// Give each class copies of the base members it does not define.
    ///
    /// The nearest ancestor wins when several define the same name.
    fn inherit_members(&mut self) {
        for index in 0..self.class_count() {
            let id = ClassId(index);
            let class = self.class(id);

            let mut method_names: HashSet<&str> =
                class.methods.iter().map(|m| m.name.as_str()).collect();
            let mut property_names: HashSet<&str> =
                class.properties.iter().map(|p| p.name.as_str()).collect();
            let mut methods: Vec<Function> = Vec::new();
            let mut properties: Vec<Property> = Vec::new();

            for ancestor in class.lineage.iter().rev().skip(1) {
                let base = self.class(*ancestor);
                for method in base.methods.iter().filter(|m| m.inherited_from.is_none()) {
                    if method_names.insert(&method.name) {
                        let mut copy = method.clone();
                        copy.qualified_name = format!("{}.{}", class.name, method.name);
                        copy.owner = Some(id);
                        copy.inherited_from = Some(*ancestor);
                        methods.push(copy);
                    }
                }
                for property in base.properties.iter().filter(|p| p.inherited_from.is_none()) {
                    if property_names.insert(&property.name) {
                        let mut copy = property.clone();
                        copy.qualified_name = format!("{}.{}", class.name, property.name);
                        copy.owner = id;
                        copy.inherited_from = Some(*ancestor);
                        properties.push(copy);
                    }
                }
            }

            let class = self.class_mut(id);
            class.methods.extend(methods);
            class.properties.extend(properties);
        }
    }

    fn mark_included(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for function in self.functions_mut() {
            function.included = !function.fragments.is_empty();
            note_excluded(
                &mut diagnostics,
                EntityKind::Function,
                &function.qualified_name,
                &function.description,
                function.included,
            );
        }

        for index in 0..self.class_count() {
            let id = ClassId(index);
            let included = self.has_effective_fragments(id);
            let class = self.class_mut(id);
            class.included = included;
            note_excluded(
                &mut diagnostics,
                EntityKind::Class,
                &class.name,
                &class.description,
                included,
            );

            let mut orphaned = false;
            for method in &mut class.methods {
                let annotated = !method.fragments.is_empty();
                method.included = included && annotated;
                orphaned |= !included && annotated;
                if method.inherited_from.is_none() && included {
                    note_excluded(
                        &mut diagnostics,
                        EntityKind::Function,
                        &method.qualified_name,
                        &method.description,
                        method.included,
                    );
                }
            }
            for property in &mut class.properties {
                let annotated = property.getter().is_some() || property.setter().is_some();
                property.included = included && annotated;
                orphaned |= !included && annotated;
                if property.inherited_from.is_none() && included {
                    note_excluded(
                        &mut diagnostics,
                        EntityKind::Property,
                        &property.qualified_name,
                        &property.description,
                        property.included,
                    );
                }
            }

            if orphaned {
                diagnostics.push(
                    Diagnostic::warning(
                        PHASE,
                        format!(
                            "class '{}' has no fragments, so its annotated members are not exported",
                            class.name
                        ),
                    )
                    .at(&class.name),
                );
            }
        }

        diagnostics
    }

    fn base_error(&self, id: ClassId, base: &str, reason: &str) -> Box<Error> {
        let class = self.class(id);
        Box::new(Error::UnresolvedReference {
            name: base.to_string(),
            tag: "base class".to_string(),
            entity: class.name.clone(),
            key: FragmentKey::Default.to_string(),
            position: class.position.to_string(),
            reason: reason.to_string(),
            src: NamedSource::new(
                format!("{} ({})", class.position, class.name),
                class.doc.clone(),
            ),
            span: None,
        })
    }
}

fn note_excluded(
    diagnostics: &mut Vec<Diagnostic>,
    kind: EntityKind,
    name: &str,
    description: &str,
    included: bool,
) {
    if included {
        return;
    }
    tracing::debug!(kind = %kind, entity = name, "not exported: no fragments");
    if !description.is_empty() {
        diagnostics.push(
            Diagnostic::info(
                PHASE,
                format!("{kind} '{name}' is documented but has no fragment, not exported"),
            )
            .at(name),
        );
    }
}
