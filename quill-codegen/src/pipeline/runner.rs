//! Pipeline orchestrator.

use quill_manifest::Manifest;

use super::{
    CompilationContext, Phase, PhaseInfo, Plugin,
    phases::{FinalizePhase, ParsePhase, RenderPhase, ValidatePhase},
};
use crate::Result;

/// The compilation pipeline orchestrator.
///
/// The pipeline runs the built-in phases (validate, parse, finalize, render)
/// followed by any user phases, calling plugin hooks before and after each
/// phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .plugin(SnapshotPlugin::new())
///     .output_name("example");
///
/// let ctx = pipeline.run(manifest)?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
    output_name: Option<String>,
}

impl Pipeline {
    /// Create a new pipeline with the default built-in phases.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
            output_name: None,
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Base name of the output files (defaults to the module name).
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Information about every phase, built-in phases first.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        builtin_phases()
            .iter()
            .chain(self.phases.iter())
            .map(|phase| phase.info())
            .collect()
    }

    /// Run the pipeline on a manifest.
    ///
    /// Executes all phases in order:
    /// 1. ValidatePhase - lints the manifest, collects diagnostics
    /// 2. ParsePhase - extracts fragments into the entity graph
    /// 3. FinalizePhase - resolves bases and marks inclusion
    /// 4. RenderPhase - produces the artifacts
    /// 5. User phases (if any)
    ///
    /// Plugin hooks are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally.
    pub fn run(&self, manifest: Manifest) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(manifest);
        if let Some(name) = &self.output_name {
            ctx.output_name = name.clone();
        }

        for phase in builtin_phases().iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        tracing::debug!(phase = phase_name, "running phase");
        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in phases in execution order.
fn builtin_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(ValidatePhase::new()),
        Box::new(ParsePhase),
        Box::new(FinalizePhase),
        Box::new(RenderPhase),
    ]
}
