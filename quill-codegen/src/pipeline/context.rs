//! Compilation context passed through pipeline phases.

use quill_manifest::Manifest;

use super::diagnostic::{Diagnostic, Severity};
use crate::{EntityGraph, Error, Result, render::Artifacts};

/// Context passed through all pipeline phases.
///
/// This struct carries the state of compilation through each phase,
/// accumulating results and diagnostics along the way.
#[derive(Debug)]
pub struct CompilationContext {
    /// The discovery manifest being compiled.
    pub manifest: Manifest,
    /// Base name of the output files.
    pub output_name: String,
    /// The entity graph (built by ParsePhase, finalized by FinalizePhase).
    pub graph: Option<EntityGraph>,
    /// The rendered buffers (populated by RenderPhase).
    pub artifacts: Option<Artifacts>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a new compilation context; outputs are named after the module.
    pub fn new(manifest: Manifest) -> Self {
        let output_name = manifest.module.name.clone();
        Self {
            manifest,
            output_name,
            graph: None,
            artifacts: None,
            diagnostics: Vec::new(),
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    /// Add an info diagnostic.
    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Error)
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    /// Get all info diagnostics.
    pub fn infos(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// The entity graph, for a phase that runs after ParsePhase.
    ///
    /// # Errors
    ///
    /// [`Error::PhaseOrder`] when the graph has not been built yet.
    pub fn require_graph(&self, phase: &'static str) -> Result<&EntityGraph> {
        self.graph.as_ref().ok_or_else(|| phase_order(phase, "parse"))
    }

    /// Mutable access to the entity graph.
    pub fn require_graph_mut(&mut self, phase: &'static str) -> Result<&mut EntityGraph> {
        self.graph.as_mut().ok_or_else(|| phase_order(phase, "parse"))
    }

    /// The rendered artifacts.
    ///
    /// # Errors
    ///
    /// [`Error::PhaseOrder`] when RenderPhase has not run.
    pub fn artifacts(&self) -> Result<&Artifacts> {
        self.artifacts
            .as_ref()
            .ok_or_else(|| phase_order("artifacts", "render"))
    }

    /// Take the artifacts out of the context, consuming them.
    pub fn take_artifacts(&mut self) -> Result<Artifacts> {
        self.artifacts
            .take()
            .ok_or_else(|| phase_order("artifacts", "render"))
    }
}

fn phase_order(phase: &'static str, needs: &'static str) -> Box<Error> {
    Box::new(Error::PhaseOrder { phase, needs })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn make_test_manifest() -> Manifest {
        Manifest::from_str("[module]\nname = \"test\"").expect("Failed to parse test manifest")
    }

    #[test]
    fn test_context_creation() {
        let ctx = CompilationContext::new(make_test_manifest());

        assert_eq!(ctx.output_name, "test");
        assert!(ctx.graph.is_none());
        assert!(ctx.artifacts.is_none());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = CompilationContext::new(make_test_manifest());

        ctx.add_error("test", "test error");
        ctx.add_warning("test", "test warning");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn test_context_no_errors() {
        let mut ctx = CompilationContext::new(make_test_manifest());

        ctx.add_warning("test", "just a warning");
        ctx.add_info("test", "just info");

        assert!(!ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.infos().count(), 1);
    }

    #[test]
    fn test_missing_graph_is_phase_order_error() {
        let ctx = CompilationContext::new(make_test_manifest());
        let err = ctx.require_graph("finalize").unwrap_err();
        assert!(matches!(
            *err,
            Error::PhaseOrder {
                phase: "finalize",
                needs: "parse"
            }
        ));
        assert!(ctx.artifacts().is_err());
    }
}
