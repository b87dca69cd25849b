//! Core utilities and types for the quill generator.
//!
//! This crate provides the file-writing rules and the C text helpers shared
//! by the manifest, codegen and CLI crates.

mod cstr;
mod file;

// File operations
pub use file::{FileRules, GeneratedFile, WriteResult};
// C text utilities
pub use cstr::{CPP_KEYWORDS, is_c_identifier, is_cpp_keyword, to_c_string};
