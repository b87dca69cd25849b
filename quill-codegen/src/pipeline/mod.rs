//! Compilation pipeline from discovery manifest to artifacts.
//!
//! [`Pipeline`] runs the built-in phases (validate → parse → finalize →
//! render) followed by any user phases, calling plugin hooks around each
//! one. Phases share state through a [`CompilationContext`] and report
//! non-fatal problems as [`Diagnostic`]s.
//!
//! # Example
//!
//! ```ignore
//! use quill_codegen::pipeline::Pipeline;
//!
//! let ctx = Pipeline::new().output_name("example").run(manifest)?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("{diag}");
//! }
//! let artifacts = ctx.artifacts()?;
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};
