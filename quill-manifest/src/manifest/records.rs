//! Entity discovery records.

use serde::Deserialize;

/// The module record: name, source file and module documentation.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRecord {
    /// Module name (also the Python import name)
    pub name: String,

    /// Source file the records were discovered in
    pub file: Option<String>,

    /// Module documentation, may embed fragments
    #[serde(default)]
    pub doc: String,
}

impl ModuleRecord {
    /// The source file name used in position comments.
    pub fn file_name(&self) -> String {
        self.file
            .clone()
            .unwrap_or_else(|| format!("{}.py", self.name))
    }
}

/// A discovered function or method.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionRecord {
    /// Function name
    pub name: String,

    /// Raw documentation text
    #[serde(default)]
    pub doc: String,

    /// Line of the definition in the source file
    pub line: Option<u32>,

    /// Number of positional parameters (including `self` for methods)
    #[serde(default)]
    pub params: usize,

    /// Whether the signature takes `*args`
    #[serde(default)]
    pub varargs: bool,

    /// Whether the signature takes `**kwargs`
    #[serde(default)]
    pub kwargs: bool,
}

/// A discovered class.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassRecord {
    /// Class name
    pub name: String,

    /// Raw documentation text
    #[serde(default)]
    pub doc: String,

    /// Line of the definition in the source file
    pub line: Option<u32>,

    /// Declared base class names, in declaration order
    #[serde(default)]
    pub bases: Vec<String>,

    /// Methods defined in the class body
    #[serde(default)]
    pub methods: Vec<FunctionRecord>,

    /// Properties defined in the class body
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

/// A discovered property.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyRecord {
    /// Property name
    pub name: String,

    /// Raw documentation text (of the getter)
    #[serde(default)]
    pub doc: String,

    /// Line of the getter definition
    pub line: Option<u32>,

    /// Whether the discovered property has a setter
    #[serde(default)]
    pub setter: bool,
}
