// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Discovery manifest for the quill generator.
//!
//! The manifest is the ordered list of entity discovery records (module,
//! functions, classes with their methods and properties) that the generator
//! consumes, plus the `[generator]` settings table.

mod error;
mod manifest;

pub use error::{Error, Result, SourceContext};
pub use manifest::{
    ClassRecord, FunctionRecord, GeneratorConfig, Manifest, ModuleRecord, ParseContext,
    PropertyRecord, QuillToml,
};
