// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Fragment parsing, tag resolution and CPython C-API rendering.
//!
//! Documentation text carries `_CPP_:` fragments of C++ code. This crate
//! splits them out, resolves the `$TAG(...)` references inside them against
//! the discovered classes and assembles everything into an interface and an
//! implementation file.
//!
//! # Module Organization
//!
//! - [`annotation`] - Splitting documentation into description and fragments
//! - [`entity`] - Discovered entities and the [`EntityGraph`]
//! - [`tags`] - `$TAG(args)` lexing and resolution
//! - [`template`] - `%(key)s` substitution with column propagation
//! - [`table`] - Column-aligned fixed-schema struct tables
//! - [`abi`] - Static CPython layout and slot data
//! - [`render`] - The module renderer producing [`Artifacts`]
//! - [`pipeline`] - Phases, plugins and diagnostics

pub mod abi;
pub mod annotation;
mod builder;
pub mod entity;
mod error;
mod indent;
mod naming;
pub mod pipeline;
pub mod render;
pub mod table;
pub mod tags;
pub mod template;
mod text;

pub use builder::{CodeBuilder, Indented};
pub use entity::{EntityGraph, FinalizeOptions};
pub use error::{Error, Result};
pub use indent::{DEFAULT_INDENT_WIDTH, IndentContext};
pub use naming::{ClassSymbols, Naming};
pub use render::{Artifacts, ModuleRenderer, RenderOptions};
pub use text::{DEFAULT_TAB_WIDTH, IndentNormalizer, reindent, trim_blank_edges};
