//! Reference resolution
//!
//! Reference nodes stage an entity like object nodes do, but injection hands
//! that entity to a [`ReferenceResolver`] to find the shared instance that
//! already exists in the target graph instead of constructing a new one.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::context::Context;
use crate::errors::Result;
use crate::model::{ModelValue, ObjectRef, TypeName};

/// What a reference node asks the resolver for
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRequest {
    /// Path of the reference node, for diagnostics
    pub node_path: String,
    /// Concrete staged type, or the node's declared type
    pub type_name: TypeName,
    /// Scalars staged for the reference, typically its natural key
    pub keys: IndexMap<String, ModelValue>,
}

impl ReferenceRequest {
    /// Keys rendered as `{a=1, b="x"}`
    pub fn describe_keys(&self) -> String {
        let parts: Vec<String> = self
            .keys
            .iter()
            .map(|(k, v)| format!("{}={}", k, describe(v)))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

fn describe(value: &ModelValue) -> String {
    match value {
        ModelValue::Text(s) => format!("\"{}\"", s),
        ModelValue::Int(i) => i.to_string(),
        ModelValue::Float(x) => x.to_string(),
        ModelValue::Bool(b) => b.to_string(),
        other => other.kind_name().to_string(),
    }
}

/// Maps a staged reference to an existing shared object
///
/// Resolvers work with live model handles and are supplied per call, so
/// they are not required to be `Send`. Resolution must be deterministic.
pub trait ReferenceResolver {
    /// `Ok(None)` means no target exists; the engine decides whether that
    /// is an error.
    ///
    /// # Errors
    ///
    /// Resolver-specific failures.
    fn resolve(&self, request: &ReferenceRequest, ctx: &Context<'_>) -> Result<Option<ModelValue>>;
}

/// Resolves references against every object reachable from a set of roots
///
/// Objects are indexed depth-first in property order; when two objects of
/// the same type share a key the first one found wins.
#[derive(Clone)]
pub struct GraphReferenceResolver {
    key_property: String,
    index: Vec<(TypeName, ModelValue, ObjectRef)>,
}

impl GraphReferenceResolver {
    pub fn new(key_property: impl Into<String>) -> Self {
        Self {
            key_property: key_property.into(),
            index: Vec::new(),
        }
    }

    /// Index every object reachable from `root`
    pub fn with_root(mut self, root: &ModelValue) -> Self {
        let mut seen: HashSet<usize> = self.index.iter().map(|(_, _, o)| o.address()).collect();
        let mut stack = vec![root.clone()];
        while let Some(value) = stack.pop() {
            match value {
                ModelValue::Object(obj) => {
                    if !seen.insert(obj.address()) {
                        continue;
                    }
                    let key = obj.get(&self.key_property);
                    if !key.is_null() {
                        self.index.push((obj.type_name(), key, obj.clone()));
                    }
                    let children: Vec<ModelValue> =
                        obj.bean().properties.values().cloned().collect();
                    stack.extend(children.into_iter().rev());
                }
                ModelValue::List(items) => stack.extend(items.into_iter().rev()),
                ModelValue::Map(map) => stack.extend(map.into_values().rev()),
                _ => {}
            }
        }
        tracing::debug!(
            key_property = %self.key_property,
            indexed = self.index.len(),
            "reference index built"
        );
        self
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl fmt::Debug for GraphReferenceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphReferenceResolver")
            .field("key_property", &self.key_property)
            .field("indexed", &self.index.len())
            .finish()
    }
}

impl ReferenceResolver for GraphReferenceResolver {
    fn resolve(&self, request: &ReferenceRequest, ctx: &Context<'_>) -> Result<Option<ModelValue>> {
        let Some(key) = request.keys.get(&self.key_property) else {
            return Ok(None);
        };
        let types = &ctx.config().types;
        Ok(self
            .index
            .iter()
            .find(|(ty, k, _)| k == key && types.is_assignable(ty, &request.type_name))
            .map(|(_, _, obj)| ModelValue::Object(obj.clone())))
    }
}
