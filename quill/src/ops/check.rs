//! Check operation - run the whole pipeline without writing anything.

use std::path::Path;

use quill_codegen::{
    Result,
    pipeline::{Pipeline, Severity},
};
use quill_manifest::Manifest;

use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Rendering runs too, so unresolved tags are reported, but nothing is
/// written.
pub fn check(manifest: &Manifest, config_path: &Path) -> Result<CheckReport> {
    let ctx = Pipeline::new().run(manifest.clone())?;

    let graph = ctx.require_graph("check")?;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    for diag in &ctx.diagnostics {
        let msg = match (&diag.location, diag.location.as_deref().and_then(|l| graph.entity(l))) {
            (Some(loc), Some(entity)) => {
                format!("{}\n  --> {} ({})", diag.message, entity.position(), loc)
            }
            (Some(loc), None) => format!("{}\n  --> {}", diag.message, loc),
            (None, _) => diag.message.clone(),
        };

        match diag.severity {
            Severity::Error => errors.push(msg),
            Severity::Warning => warnings.push(msg),
            Severity::Info => infos.push(msg),
        }
    }

    let classes = graph.included_classes().count();
    let functions = graph.included_functions().count();

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        errors,
        warnings,
        infos,
        classes,
        functions,
    })
}
