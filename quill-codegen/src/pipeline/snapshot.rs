//! Pipeline snapshot plugin for visualization and debugging.
//!
//! The plugin captures the pipeline state after each phase so that the
//! `--visualize` flag can dump the entity graph and rendered buffers as
//! JSON.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use serde::Serialize;

use super::{CompilationContext, Diagnostic, Plugin};
use crate::{EntityGraph, Error, Result, render::Artifacts};

/// A snapshot of the pipeline state at a specific phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSnapshot {
    /// The phase that just completed.
    pub phase: String,

    /// The entity graph (available after "parse" phase).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<EntityGraph>,

    /// The rendered buffers (available after "render" phase).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Artifacts>,

    /// Diagnostics collected so far.
    pub diagnostics: Vec<Diagnostic>,
}

impl PhaseSnapshot {
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| {
            Box::new(Error::Snapshot {
                phase: self.phase.clone(),
                source,
            })
        })
    }

    fn write_into(&self, dir: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        let path = dir.join(format!("{}.json", self.phase));
        fs::write(&path, json).map_err(|source| io_error(&path, source))
    }
}

/// A plugin that captures pipeline state after each phase.
///
/// # Example
///
/// ```ignore
/// let snapshot_plugin = Arc::new(SnapshotPlugin::new());
/// let pipeline = Pipeline::new().plugin(snapshot_plugin.clone());
/// let ctx = pipeline.run(manifest)?;
///
/// // Write snapshots to disk
/// snapshot_plugin.write_to_dir(".quill/debug")?;
/// ```
pub struct SnapshotPlugin {
    snapshots: RwLock<Vec<PhaseSnapshot>>,
    output_dir: Option<PathBuf>,
}

impl SnapshotPlugin {
    /// Create a new snapshot plugin.
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: None,
        }
    }

    /// Create a snapshot plugin that writes each snapshot as it is taken.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: Some(output_dir.into()),
        }
    }

    /// Get all collected snapshots.
    pub fn snapshots(&self) -> Vec<PhaseSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write all snapshots to `dir` as `<phase>.json`.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        for snapshot in self
            .snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            snapshot.write_into(dir)?;
        }
        Ok(())
    }

    fn capture_snapshot(&self, phase: &str, ctx: &CompilationContext) -> PhaseSnapshot {
        let snapshot = PhaseSnapshot {
            phase: phase.to_string(),
            graph: ctx.graph.clone(),
            artifacts: ctx.artifacts.clone(),
            diagnostics: ctx.diagnostics.clone(),
        };
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        snapshot
    }
}

impl Default for SnapshotPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        let snapshot = self.capture_snapshot(phase, ctx);

        if let Some(dir) = &self.output_dir {
            snapshot.write_into(dir)?;
            tracing::debug!(phase, dir = %dir.display(), "wrote phase snapshot");
        }

        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> Box<Error> {
    Box::new(Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc};

    use quill_manifest::Manifest;

    use super::*;
    use crate::pipeline::Pipeline;

    fn make_test_manifest() -> Manifest {
        Manifest::from_str(
            r#"
            [module]
            name = "snap"

            [[classes]]
            name = "Point"
            doc = "_CPP_: int x;"
        "#,
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_plugin_creation() {
        let plugin = SnapshotPlugin::new();
        assert!(plugin.snapshots().is_empty());
    }

    #[test]
    fn test_snapshot_per_phase() {
        let plugin = Arc::new(SnapshotPlugin::new());
        Pipeline::new()
            .plugin(plugin.clone())
            .run(make_test_manifest())
            .unwrap();

        let snapshots = plugin.snapshots();
        let phases: Vec<_> = snapshots.iter().map(|s| s.phase.as_str()).collect();
        assert_eq!(phases, ["validate", "parse", "finalize", "render"]);
        assert!(snapshots[0].graph.is_none());
        assert!(snapshots[1].graph.is_some());
        assert!(snapshots[2].artifacts.is_none());
        assert!(snapshots[3].artifacts.is_some());
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("debug");
        let plugin = Arc::new(SnapshotPlugin::with_output_dir(&out));
        Pipeline::new()
            .plugin(plugin.clone())
            .run(make_test_manifest())
            .unwrap();

        let render = fs::read_to_string(out.join("render.json")).unwrap();
        assert!(render.contains("\"implementation\""));
        let parse = fs::read_to_string(out.join("parse.json")).unwrap();
        assert!(parse.contains("\"Point\""));
        assert!(!parse.contains("\"artifacts\""));
    }
}
