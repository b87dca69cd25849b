//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`ValidatePhase`] - lints the discovery manifest
//! - [`ParsePhase`] - extracts fragments and builds the entity graph
//! - [`FinalizePhase`] - resolves bases, inherits members, marks inclusion
//! - [`RenderPhase`] - renders the interface and implementation buffers

mod finalize;
mod parse;
mod render;
mod validate;

pub use finalize::FinalizePhase;
pub use parse::{ParsePhase, build_graph};
pub use render::RenderPhase;
pub use validate::{DuplicateEntityLint, EmptyFragmentLint, Lint, LintInfo, ValidatePhase};
