//! Manifest types and parsing for discovery manifests.

mod file;
mod generator;
mod parse;
mod records;
mod validate;

pub use file::QuillToml;
pub use generator::GeneratorConfig;
pub use records::{ClassRecord, FunctionRecord, ModuleRecord, PropertyRecord};
use serde::Deserialize;
pub use validate::ParseContext;

/// Root manifest: the ordered discovery records of one module.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// The module being exported
    pub module: ModuleRecord,

    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Module-level functions, in discovery order
    #[serde(default)]
    pub functions: Vec<FunctionRecord>,

    /// Classes, in discovery order
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

impl Manifest {
    /// Find a class record by name.
    pub fn class(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Find a module-level function record by name.
    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Total number of discovered records (module excluded).
    pub fn record_count(&self) -> usize {
        self.functions.len()
            + self
                .classes
                .iter()
                .map(|c| 1 + c.methods.len() + c.properties.len())
                .sum::<usize>()
    }
}
