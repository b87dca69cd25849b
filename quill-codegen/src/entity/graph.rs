use indexmap::IndexMap;
use serde::Serialize;

use super::{Class, ClassId, Entity, Function, Module};
use crate::{
    Error, Result,
    annotation::{Fragment, FragmentKey},
};

/// Owns every discovered entity, keyed by qualified name.
///
/// Classes refer to their bases through [`ClassId`]s into this graph. After
/// [`finalize`](EntityGraph::finalize) the graph is only read.
#[derive(Debug, Clone, Serialize)]
pub struct EntityGraph {
    module: Module,
    functions: IndexMap<String, Function>,
    classes: IndexMap<String, Class>,
    finalized: bool,
}

impl EntityGraph {
    pub fn new(module: Module) -> Self {
        Self {
            module,
            functions: IndexMap::new(),
            classes: IndexMap::new(),
            finalized: false,
        }
    }

    /// Add a module-level function.
    pub fn add_function(&mut self, function: Function) -> Result<()> {
        if self.functions.contains_key(&function.qualified_name) {
            return Err(Box::new(Error::DuplicateEntity {
                kind: "function",
                name: function.qualified_name,
            }));
        }
        self.functions
            .insert(function.qualified_name.clone(), function);
        Ok(())
    }

    /// Add a class and return its id.
    pub fn add_class(&mut self, class: Class) -> Result<ClassId> {
        if self.classes.contains_key(&class.name) {
            return Err(Box::new(Error::DuplicateEntity {
                kind: "class",
                name: class.name,
            }));
        }
        let (index, _) = self.classes.insert_full(class.name.clone(), class);
        Ok(ClassId(index))
    }

    /// Id the next added class will get.
    pub fn next_class_id(&self) -> ClassId {
        ClassId(self.classes.len())
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(super) fn set_finalized(&mut self) {
        self.finalized = true;
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.classes
            .values()
            .enumerate()
            .map(|(index, class)| (ClassId(index), class))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Get a class by id.
    ///
    /// Ids are only handed out by this graph, so they are always in range.
    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.0]
    }

    pub(super) fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.0]
    }

    pub(super) fn functions_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.functions.values_mut()
    }

    /// Find any class by name.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.classes.get_index_of(name).map(ClassId)
    }

    /// Find an exported class by name.
    pub fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
            .filter(|id| self.class(*id).included)
    }

    pub fn included_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| f.included)
    }

    pub fn included_classes(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.classes().filter(|(_, class)| class.included)
    }

    /// Look up an entity by qualified name (`f`, `Class`, `Class.member`).
    pub fn entity(&self, qualified_name: &str) -> Option<Entity<'_>> {
        if let Some(function) = self.functions.get(qualified_name) {
            return Some(Entity::Function(function));
        }
        if let Some(class) = self.classes.get(qualified_name) {
            return Some(Entity::Class(class));
        }
        let (class_name, member) = qualified_name.split_once('.')?;
        let class = self.classes.get(class_name)?;
        class
            .method(member)
            .map(Entity::Function)
            .or_else(|| class.property(member).map(Entity::Property))
    }

    /// All entities in discovery order, members after their class.
    pub fn entities(&self) -> Vec<Entity<'_>> {
        let mut entities: Vec<Entity<'_>> = self.functions.values().map(Entity::Function).collect();
        for class in self.classes.values() {
            entities.push(Entity::Class(class));
            entities.extend(class.methods.iter().map(Entity::Function));
            entities.extend(class.properties.iter().map(Entity::Property));
        }
        entities
    }

    /// Ancestors of a class base-first, ending with the class.
    pub fn lineage(&self, id: ClassId) -> Vec<ClassId> {
        let lineage = &self.class(id).lineage;
        if lineage.is_empty() {
            vec![id]
        } else {
            lineage.clone()
        }
    }

    /// The aggregated fragments of a class for `key`: each ancestor's own
    /// fragment base-first, then the class's own.
    pub fn effective_fragments(&self, id: ClassId, key: FragmentKey) -> Vec<(ClassId, &Fragment)> {
        self.lineage(id)
            .into_iter()
            .filter_map(|ancestor| {
                self.class(ancestor)
                    .fragments
                    .get(&key)
                    .map(|fragment| (ancestor, fragment))
            })
            .collect()
    }

    /// Concatenated raw bodies of [`effective_fragments`](Self::effective_fragments).
    pub fn effective_body(&self, id: ClassId, key: FragmentKey) -> String {
        self.effective_fragments(id, key)
            .iter()
            .map(|(_, fragment)| fragment.body.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the class or any ancestor carries a fragment.
    pub fn has_effective_fragments(&self, id: ClassId) -> bool {
        self.lineage(id)
            .into_iter()
            .any(|ancestor| !self.class(ancestor).fragments.is_empty())
    }
}
