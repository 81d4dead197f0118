use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::ModelValue;

/// Name of a model type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&TypeName> for TypeName {
    fn from(t: &TypeName) -> Self {
        t.clone()
    }
}

/// Single-inheritance type hierarchy for model objects
///
/// Types that were never declared are their own root: assignable only to
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    supertypes: HashMap<TypeName, TypeName>,
    abstract_types: HashSet<TypeName>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `sub` as a direct subtype of `sup`
    pub fn with_subtype(mut self, sub: impl Into<TypeName>, sup: impl Into<TypeName>) -> Self {
        self.supertypes.insert(sub.into(), sup.into());
        self
    }

    /// Mark a type as not instantiable by the default factory
    pub fn with_abstract(mut self, ty: impl Into<TypeName>) -> Self {
        self.abstract_types.insert(ty.into());
        self
    }

    pub fn is_abstract(&self, ty: &TypeName) -> bool {
        self.abstract_types.contains(ty)
    }

    pub fn supertype_of(&self, ty: &TypeName) -> Option<&TypeName> {
        self.supertypes.get(ty)
    }

    /// Reflexive, transitive subtype test
    pub fn is_assignable(&self, sub: &TypeName, sup: &TypeName) -> bool {
        let mut current = Some(sub);
        let mut hops = 0;
        while let Some(ty) = current {
            if ty == sup {
                return true;
            }
            // A cycle in the declarations would otherwise spin forever.
            hops += 1;
            if hops > self.supertypes.len() {
                return false;
            }
            current = self.supertypes.get(ty);
        }
        false
    }

    /// Whether `value` is an object whose runtime type is assignable to `ty`
    pub fn is_instance_of(&self, value: &ModelValue, ty: &TypeName) -> bool {
        value
            .as_object()
            .is_some_and(|obj| self.is_assignable(&obj.type_name(), ty))
    }

    /// Number of supertype hops from `sub` up to `sup`, if assignable
    pub fn distance(&self, sub: &TypeName, sup: &TypeName) -> Option<usize> {
        let mut current = Some(sub);
        let mut hops = 0;
        while let Some(ty) = current {
            if ty == sup {
                return Some(hops);
            }
            hops += 1;
            if hops > self.supertypes.len() {
                return None;
            }
            current = self.supertypes.get(ty);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bean, ObjectRef};

    fn animals() -> TypeRegistry {
        TypeRegistry::new()
            .with_subtype("Dog", "Animal")
            .with_subtype("Puppy", "Dog")
            .with_subtype("Cat", "Animal")
    }

    #[test]
    fn test_assignability_is_reflexive_and_transitive() {
        let types = animals();
        assert!(types.is_assignable(&"Dog".into(), &"Dog".into()));
        assert!(types.is_assignable(&"Puppy".into(), &"Animal".into()));
        assert!(!types.is_assignable(&"Animal".into(), &"Dog".into()));
        assert!(!types.is_assignable(&"Cat".into(), &"Dog".into()));
    }

    #[test]
    fn test_distance() {
        let types = animals();
        assert_eq!(types.distance(&"Puppy".into(), &"Animal".into()), Some(2));
        assert_eq!(types.distance(&"Cat".into(), &"Dog".into()), None);
    }

    #[test]
    fn test_cyclic_declarations_terminate() {
        let types = TypeRegistry::new()
            .with_subtype("A", "B")
            .with_subtype("B", "A");
        assert!(!types.is_assignable(&"A".into(), &"C".into()));
    }

    #[test]
    fn test_is_instance_of() {
        let types = animals();
        let dog = ModelValue::Object(ObjectRef::new(Bean::new("Dog")));
        assert!(types.is_instance_of(&dog, &"Animal".into()));
        assert!(!types.is_instance_of(&dog, &"Cat".into()));
        assert!(!types.is_instance_of(&ModelValue::Null, &"Animal".into()));
    }
}
