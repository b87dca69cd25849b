//! Bake operation - code generation from a manifest.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use quill_codegen::pipeline::{CompilationContext, Pipeline, Severity, SnapshotPlugin};
use quill_core::GeneratedFile;
use quill_manifest::Manifest;

use crate::reports::{BakeReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult};

/// Directory under the output directory receiving pipeline snapshots.
const DEBUG_DIR: &str = ".quill/debug";

/// Options for the bake operation.
pub struct BakeOptions<'a> {
    /// Output directory for generated files.
    pub output_dir: &'a Path,
    /// Base name of the generated files.
    pub name: Option<&'a str>,
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// Whether to output debug snapshots.
    pub visualize: bool,
}

impl BakeOptions<'_> {
    fn debug_dir(&self) -> Option<PathBuf> {
        self.visualize.then(|| self.output_dir.join(DEBUG_DIR))
    }
}

/// Run the pipeline, with snapshots when visualizing.
pub fn compile(
    manifest: &Manifest,
    opts: &BakeOptions<'_>,
) -> quill_codegen::Result<CompilationContext> {
    let mut pipeline = Pipeline::new();
    if let Some(dir) = opts.debug_dir() {
        pipeline = pipeline.plugin(SnapshotPlugin::with_output_dir(dir));
    }
    if let Some(name) = opts.name {
        pipeline = pipeline.output_name(name);
    }
    pipeline.run(manifest.clone())
}

/// Execute the bake operation on a compiled context.
pub fn bake(mut ctx: CompilationContext, opts: &BakeOptions<'_>) -> Result<BakeReport> {
    let warnings: Vec<String> = ctx
        .diagnostics
        .iter()
        .filter(|d| matches!(d.severity, Severity::Warning))
        .map(ToString::to_string)
        .collect();

    let (classes, functions) = match &ctx.graph {
        Some(graph) => (
            graph.included_classes().map(|(_, c)| c.name.clone()).collect(),
            graph.included_functions().map(|f| f.name.clone()).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let artifacts = ctx.take_artifacts().wrap_err("Nothing was rendered")?;
    let result = if opts.dry_run {
        let files = artifacts
            .files()
            .iter()
            .map(|file| PreviewFile {
                path: file.file_name().to_string(),
                content: file.contents(),
            })
            .collect();
        GenerationResult::Preview(PreviewResult { files })
    } else {
        let files = artifacts
            .write_all(opts.output_dir)
            .wrap_err("Failed to write generated files")?;
        GenerationResult::Written(WrittenResult {
            files,
            debug_dir: opts.debug_dir(),
        })
    };

    Ok(BakeReport {
        module: ctx.manifest.module.name.clone(),
        warnings,
        classes,
        functions,
        result,
    })
}
