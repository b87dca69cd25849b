//! Built-in lints for manifest validation.

mod duplicate_entity;
mod empty_fragment;

pub use duplicate_entity::DuplicateEntityLint;
pub use empty_fragment::EmptyFragmentLint;
