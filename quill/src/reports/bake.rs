//! Bake command report data structures.

use std::path::PathBuf;

use quill_core::WriteResult;

use super::output::{Output, Report};

/// Report data from code generation.
#[derive(Debug)]
pub struct BakeReport {
    /// Module name from the manifest.
    pub module: String,

    /// Warning diagnostics from the pipeline.
    pub warnings: Vec<String>,

    /// Exported classes.
    pub classes: Vec<String>,

    /// Exported module functions.
    pub functions: Vec<String>,

    /// Generation result (files written or preview).
    pub result: GenerationResult,
}

/// Result of code generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    /// Every output file and whether it changed.
    pub files: Vec<(PathBuf, WriteResult)>,
    /// Path to debug snapshots, if visualization was enabled.
    pub debug_dir: Option<PathBuf>,
}

/// Result of a dry-run preview.
#[derive(Debug)]
pub struct PreviewResult {
    /// Files that would be generated.
    pub files: Vec<PreviewFile>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    /// File name.
    pub path: String,
    /// File content.
    pub content: String,
}

impl Report for BakeReport {
    fn render(&self, out: &mut dyn Output) {
        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl BakeReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        if let Some(debug_dir) = &written.debug_dir {
            out.key_value(
                "Pipeline snapshots written to",
                &debug_dir.display().to_string(),
            );
            out.newline();
        }

        for warning in &self.warnings {
            out.warning(warning);
        }

        out.preformatted(&format!(
            "{}: {} class{}, {} function{}",
            self.module,
            self.classes.len(),
            if self.classes.len() == 1 { "" } else { "es" },
            self.functions.len(),
            if self.functions.len() == 1 { "" } else { "s" },
        ));
        out.newline();

        out.section("Generated");
        for (path, result) in &written.files {
            match result {
                WriteResult::Written => out.added_item(&path.display().to_string()),
                WriteResult::Unchanged => {
                    out.list_item(&format!("{} (unchanged)", path.display()))
                }
            }
        }
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        for file in &preview.files {
            out.divider(&file.path);
            out.preformatted(&file.content);
        }

        out.divider("Summary");
        out.preformatted(&format!("{} files would be generated", preview.files.len()));
    }
}
