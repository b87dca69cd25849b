//! Lint for duplicate entity detection.

use std::collections::HashMap;

use quill_manifest::Manifest;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Lint that errors on duplicate function, class and member names.
///
/// Methods and properties of one class share a namespace, as they do on the
/// Python side.
pub struct DuplicateEntityLint;

impl Lint for DuplicateEntityLint {
    fn name(&self) -> &'static str {
        "duplicate-entity"
    }

    fn description(&self) -> &'static str {
        "Detect duplicate function, class and member names"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        let functions = manifest.functions.iter().map(|f| f.name.as_str());
        report_duplicates("function", functions, diagnostics, |name| name.to_string());

        let classes = manifest.classes.iter().map(|c| c.name.as_str());
        report_duplicates("class", classes, diagnostics, |name| name.to_string());

        for class in &manifest.classes {
            let members = class
                .methods
                .iter()
                .map(|m| m.name.as_str())
                .chain(class.properties.iter().map(|p| p.name.as_str()));
            report_duplicates("member", members, diagnostics, |name| {
                format!("{}.{}", class.name, name)
            });
        }
    }
}

fn report_duplicates<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
    diagnostics: &mut Vec<Diagnostic>,
    qualify: impl Fn(&str) -> String,
) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, name) in names.enumerate() {
        if let Some(first) = seen.get(name) {
            diagnostics.push(
                Diagnostic::error(
                    "validate",
                    format!(
                        "duplicate {} '{}' (record {} repeats record {})",
                        kind,
                        qualify(name),
                        index + 1,
                        first + 1
                    ),
                )
                .at(qualify(name)),
            );
        } else {
            seen.insert(name, index);
        }
    }
}
