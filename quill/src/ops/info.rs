//! Info operation - what a manifest exports.

use std::path::Path;

use quill_codegen::{
    FinalizeOptions, Result,
    entity::Entity,
    pipeline::{
        Pipeline,
        phases::{ValidatePhase, build_graph},
    },
};
use quill_manifest::Manifest;

use crate::reports::{EntityLine, InfoReport};

/// Execute the info operation.
///
/// Parses and finalizes the manifest without rendering, so excluded
/// entities are listed too.
pub fn info(manifest: &Manifest, config_path: &Path) -> Result<InfoReport> {
    let (mut graph, _) = build_graph(manifest)?;
    graph.finalize(&FinalizeOptions {
        inherit_members: manifest.generator.inherit_members,
    })?;

    let mut functions = Vec::new();
    let mut classes = Vec::new();
    for entity in graph.entities() {
        match entity {
            Entity::Function(f) if !f.is_method() => functions.push(EntityLine::of(entity, 0)),
            Entity::Class(_) => classes.push(EntityLine::of(entity, 0)),
            _ => classes.push(EntityLine::of(entity, 1)),
        }
    }

    Ok(InfoReport {
        module: manifest.module.name.clone(),
        description: graph.module().description.clone(),
        config_path: std::fs::canonicalize(config_path)
            .unwrap_or_else(|_| config_path.to_path_buf()),
        marker: manifest.generator.marker.clone(),
        prefix: manifest.generator.prefix.clone(),
        functions,
        classes,
        phases: Pipeline::new()
            .phase_info()
            .into_iter()
            .map(|p| (p.name, p.description))
            .collect(),
        lints: ValidatePhase::new()
            .lint_info()
            .into_iter()
            .map(|l| (l.name, l.description))
            .collect(),
    })
}

impl EntityLine {
    fn of(entity: Entity<'_>, depth: usize) -> Self {
        let keys = entity
            .fragments()
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: entity.qualified_name().to_string(),
            kind: entity.kind().label(),
            keys,
            included: entity.included(),
            depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_info_lists_excluded() {
        let manifest = Manifest::from_str(
            r#"
            [module]
            name = "demo"
            doc = "A demo."

            [[functions]]
            name = "plain"
            doc = "No code."

            [[classes]]
            name = "Shown"
            doc = "_CPP_(NEW): init();"
        "#,
        )
        .unwrap();

        let report = info(&manifest, Path::new("quill.toml")).unwrap();
        assert_eq!(report.description, "A demo.");
        assert_eq!(report.functions.len(), 1);
        assert!(!report.functions[0].included);
        assert_eq!(report.classes[0].name, "Shown");
        assert_eq!(report.classes[0].keys, "NEW");
        assert!(report.classes[0].included);
        assert_eq!(report.phases.len(), 4);
        assert_eq!(report.lints.len(), 2);
    }
}
