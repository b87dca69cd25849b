//! Discovered entities and the graph that owns them.

mod finalize;
mod graph;

use std::fmt;

pub use finalize::FinalizeOptions;
pub use graph::EntityGraph;
use serde::Serialize;

use crate::annotation::{Fragment, FragmentKey, FragmentMap};

/// The kinds of entity that can carry fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Module,
    Function,
    Class,
    Property,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Function => "function",
            Self::Class => "class",
            Self::Property => "property",
        }
    }

    /// Fragment keys this kind accepts.
    pub fn supported_keys(&self) -> &'static [FragmentKey] {
        match self {
            Self::Module => &[FragmentKey::Default, FragmentKey::Header],
            Self::Function => &[FragmentKey::Default],
            Self::Class => &[
                FragmentKey::Default,
                FragmentKey::New,
                FragmentKey::Free,
                FragmentKey::Copy,
            ],
            Self::Property => &[FragmentKey::Get, FragmentKey::Set],
        }
    }

    pub fn supports(&self, key: FragmentKey) -> bool {
        self.supported_keys().contains(&key)
    }

    /// Comma-separated supported keys, for messages.
    pub fn supported_list(&self) -> String {
        self.supported_keys()
            .iter()
            .map(FragmentKey::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Key of an unkeyed marker, given the keys already taken.
    ///
    /// On a property the first unkeyed marker is the getter and a second one
    /// is the setter.
    pub fn bare_key(&self, taken: &FragmentMap) -> FragmentKey {
        match self {
            Self::Property if taken.contains_key(&FragmentKey::Get) => {
                if taken.contains_key(&FragmentKey::Set) {
                    FragmentKey::Get
                } else {
                    FragmentKey::Set
                }
            }
            Self::Property => FragmentKey::Get,
            _ => FragmentKey::Default,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where an entity was defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    pub file: String,
    pub line: Option<u32>,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => f.write_str(&self.file),
        }
    }
}

/// Index of a class within its [`EntityGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassId(pub(crate) usize);

/// Parameter shape of a function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// Positional parameters, `self` included for methods
    pub params: usize,
    pub varargs: bool,
    pub kwargs: bool,
}

/// The module being exported.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub name: String,
    #[serde(skip)]
    pub doc: String,
    pub description: String,
    pub fragments: FragmentMap,
    pub position: SourcePosition,
}

impl Module {
    pub fn fragment(&self, key: FragmentKey) -> Option<&Fragment> {
        self.fragments.get(&key)
    }
}

/// A module-level function or a class method.
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    /// `name` or `Class.name`
    pub qualified_name: String,
    #[serde(skip)]
    pub doc: String,
    pub description: String,
    pub fragments: FragmentMap,
    pub position: SourcePosition,
    pub signature: Signature,
    /// Class the method belongs to, `None` for module functions
    pub owner: Option<ClassId>,
    /// Base class the method was copied from
    pub inherited_from: Option<ClassId>,
    pub included: bool,
}

impl Function {
    pub fn body(&self) -> Option<&Fragment> {
        self.fragments.get(&FragmentKey::Default)
    }

    pub fn is_method(&self) -> bool {
        self.owner.is_some()
    }
}

/// A class property.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub name: String,
    pub qualified_name: String,
    #[serde(skip)]
    pub doc: String,
    pub description: String,
    pub fragments: FragmentMap,
    pub position: SourcePosition,
    /// Whether discovery found a setter
    pub has_setter: bool,
    pub owner: ClassId,
    pub inherited_from: Option<ClassId>,
    pub included: bool,
}

impl Property {
    pub fn getter(&self) -> Option<&Fragment> {
        self.fragments.get(&FragmentKey::Get)
    }

    pub fn setter(&self) -> Option<&Fragment> {
        self.fragments.get(&FragmentKey::Set)
    }
}

/// A class with its members.
#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub name: String,
    #[serde(skip)]
    pub doc: String,
    pub description: String,
    pub fragments: FragmentMap,
    pub position: SourcePosition,
    /// Declared base names, in declaration order
    pub base_names: Vec<String>,
    /// Resolved bases (set by finalize)
    pub bases: Vec<ClassId>,
    /// Ancestors base-first, ending with the class itself (set by finalize)
    pub lineage: Vec<ClassId>,
    pub methods: Vec<Function>,
    pub properties: Vec<Property>,
    pub included: bool,
}

impl Class {
    pub fn method(&self, name: &str) -> Option<&Function> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn included_methods(&self) -> impl Iterator<Item = &Function> {
        self.methods.iter().filter(|m| m.included)
    }

    pub fn included_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| p.included)
    }
}

/// Borrowed view over any entity.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Function(&'a Function),
    Class(&'a Class),
    Property(&'a Property),
}

impl<'a> Entity<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Function(_) => EntityKind::Function,
            Self::Class(_) => EntityKind::Class,
            Self::Property(_) => EntityKind::Property,
        }
    }

    pub fn qualified_name(&self) -> &'a str {
        match self {
            Self::Function(f) => &f.qualified_name,
            Self::Class(c) => &c.name,
            Self::Property(p) => &p.qualified_name,
        }
    }

    pub fn description(&self) -> &'a str {
        match self {
            Self::Function(f) => &f.description,
            Self::Class(c) => &c.description,
            Self::Property(p) => &p.description,
        }
    }

    pub fn fragments(&self) -> &'a FragmentMap {
        match self {
            Self::Function(f) => &f.fragments,
            Self::Class(c) => &c.fragments,
            Self::Property(p) => &p.fragments,
        }
    }

    pub fn position(&self) -> &'a SourcePosition {
        match self {
            Self::Function(f) => &f.position,
            Self::Class(c) => &c.position,
            Self::Property(p) => &p.position,
        }
    }

    pub fn included(&self) -> bool {
        match self {
            Self::Function(f) => f.included,
            Self::Class(c) => c.included,
            Self::Property(p) => p.included,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_keys() {
        assert!(EntityKind::Class.supports(FragmentKey::Copy));
        assert!(!EntityKind::Function.supports(FragmentKey::New));
        assert!(EntityKind::Module.supports(FragmentKey::Header));
        assert!(!EntityKind::Property.supports(FragmentKey::Default));
        assert_eq!(EntityKind::Class.supported_list(), "default, NEW, FREE, COPY");
    }

    #[test]
    fn test_bare_key() {
        let mut taken = FragmentMap::new();
        assert_eq!(EntityKind::Function.bare_key(&taken), FragmentKey::Default);
        assert_eq!(EntityKind::Property.bare_key(&taken), FragmentKey::Get);

        taken.insert(
            FragmentKey::Get,
            Fragment {
                key: FragmentKey::Get,
                body: "x".to_string(),
                offset: 0,
                marker: 0..0,
            },
        );
        assert_eq!(EntityKind::Property.bare_key(&taken), FragmentKey::Set);
    }

    #[test]
    fn test_source_position_display() {
        assert_eq!(SourcePosition::new("a.py", Some(3)).to_string(), "a.py:3");
        assert_eq!(SourcePosition::new("a.py", None).to_string(), "a.py");
    }
}
