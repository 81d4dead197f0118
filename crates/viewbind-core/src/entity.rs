//! Staging objects produced while applying a view
//!
//! Application is split in two passes: events are first consumed into
//! [`Entity`] property bags without touching the target model, and only then
//! injected. A view that fails to parse therefore leaves the target intact.

use indexmap::IndexMap;

use crate::event::Event;
use crate::model::{ModelValue, TypeName};
use crate::node::Node;

/// One staged value
#[derive(Debug, Clone)]
pub enum Staged<'t> {
    /// Explicit null, including a null object or collection
    Null,
    /// Already converted scalar
    Scalar(ModelValue),
    Entity(Entity<'t>),
    List(Vec<Staged<'t>>),
    Map(IndexMap<String, Staged<'t>>),
    /// Raw sub-view captured for a splice handler
    View(Vec<Event>),
}

impl<'t> Staged<'t> {
    pub fn is_null(&self) -> bool {
        matches!(self, Staged::Null | Staged::Scalar(ModelValue::Null))
    }

    pub fn as_entity(&self) -> Option<&Entity<'t>> {
        match self {
            Staged::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Short label used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Staged::Null => "null",
            Staged::Scalar(_) => "scalar",
            Staged::Entity(_) => "object",
            Staged::List(_) => "list",
            Staged::Map(_) => "map",
            Staged::View(_) => "view",
        }
    }
}

/// A staged property together with the node that will inject it
#[derive(Debug, Clone)]
pub struct StagedProperty<'t> {
    pub node: &'t Node,
    pub value: Staged<'t>,
}

/// Ordered property bag for one object-shaped subtree
#[derive(Debug, Clone, Default)]
pub struct Entity<'t> {
    type_name: Option<TypeName>,
    properties: IndexMap<String, StagedProperty<'t>>,
}

impl<'t> Entity<'t> {
    pub fn new(type_name: Option<TypeName>) -> Self {
        Self {
            type_name,
            properties: IndexMap::new(),
        }
    }

    /// Concrete type, after discriminator resolution
    pub fn type_name(&self) -> Option<&TypeName> {
        self.type_name.as_ref()
    }

    pub fn set_type_name(&mut self, type_name: TypeName) {
        self.type_name = Some(type_name);
    }

    /// Stage a property; a repeated name replaces the earlier value in place
    pub fn insert(&mut self, name: impl Into<String>, node: &'t Node, value: Staged<'t>) {
        self.properties
            .insert(name.into(), StagedProperty { node, value });
    }

    pub fn get(&self, name: &str) -> Option<&StagedProperty<'t>> {
        self.properties.get(name)
    }

    /// Staged scalar under `name`, if any
    pub fn scalar(&self, name: &str) -> Option<&ModelValue> {
        match self.properties.get(name).map(|p| &p.value) {
            Some(Staged::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// All staged scalars in staging order; the natural keys of a reference
    pub fn scalars(&self) -> IndexMap<String, ModelValue> {
        self.properties
            .iter()
            .filter_map(|(name, p)| match &p.value {
                Staged::Scalar(v) => Some((name.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StagedProperty<'t>)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}
