//! Discriminator-based polymorphism

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ViewError};
use crate::model::{TypeName, TypeRegistry};

/// Default discriminator property name
pub const DEFAULT_DISCRIMINATOR: &str = "@type";

/// Tag identifying the concrete subtype of a polymorphic object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Discriminator {
    pub name: String,
    pub value: String,
}

impl Discriminator {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Converts between a concrete subtype and its discriminator
pub trait DiscriminatorStrategy: Send + Sync {
    /// # Errors
    ///
    /// Returns `TypeMismatch` when `concrete` has no discriminator under `base`.
    fn to_discriminator(&self, base: &TypeName, concrete: &TypeName) -> Result<Discriminator>;

    /// # Errors
    ///
    /// Returns `TypeMismatch` when the value is unknown or names a type that
    /// is not assignable to `base`.
    fn to_subtype(
        &self,
        base: &TypeName,
        discriminator: &Discriminator,
        types: &TypeRegistry,
    ) -> Result<TypeName>;
}

/// Uses the runtime type name itself as the discriminator value
#[derive(Debug, Clone)]
pub struct TypeNameDiscriminatorStrategy {
    property: String,
}

impl TypeNameDiscriminatorStrategy {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

impl Default for TypeNameDiscriminatorStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DISCRIMINATOR)
    }
}

impl DiscriminatorStrategy for TypeNameDiscriminatorStrategy {
    fn to_discriminator(&self, _base: &TypeName, concrete: &TypeName) -> Result<Discriminator> {
        Ok(Discriminator::new(&self.property, concrete.as_str()))
    }

    fn to_subtype(
        &self,
        base: &TypeName,
        discriminator: &Discriminator,
        types: &TypeRegistry,
    ) -> Result<TypeName> {
        let ty = TypeName::new(discriminator.value.as_str());
        if !types.is_assignable(&ty, base) {
            return Err(ViewError::type_mismatch(format!(
                "discriminator {}={} is not a subtype of {}",
                discriminator.name, discriminator.value, base
            )));
        }
        Ok(ty)
    }
}

/// Explicit table of discriminator values and types
///
/// Values must be unique; registering a second type for the same value
/// replaces the first.
#[derive(Debug, Clone)]
pub struct MappedDiscriminatorStrategy {
    property: String,
    by_value: BTreeMap<String, TypeName>,
    by_type: BTreeMap<TypeName, String>,
}

impl MappedDiscriminatorStrategy {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            by_value: BTreeMap::new(),
            by_type: BTreeMap::new(),
        }
    }

    pub fn with(mut self, value: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        let value = value.into();
        let ty = ty.into();
        if let Some(previous) = self.by_value.insert(value.clone(), ty.clone()) {
            self.by_type.remove(&previous);
        }
        self.by_type.insert(ty, value);
        self
    }
}

impl DiscriminatorStrategy for MappedDiscriminatorStrategy {
    fn to_discriminator(&self, base: &TypeName, concrete: &TypeName) -> Result<Discriminator> {
        self.by_type
            .get(concrete)
            .map(|value| Discriminator::new(&self.property, value.as_str()))
            .ok_or_else(|| {
                ViewError::type_mismatch(format!(
                    "type {} has no discriminator value under {}",
                    concrete, base
                ))
            })
    }

    fn to_subtype(
        &self,
        base: &TypeName,
        discriminator: &Discriminator,
        types: &TypeRegistry,
    ) -> Result<TypeName> {
        let ty = self.by_value.get(&discriminator.value).ok_or_else(|| {
            ViewError::type_mismatch(format!(
                "unknown discriminator {}={}",
                discriminator.name, discriminator.value
            ))
        })?;
        if !types.is_assignable(ty, base) {
            return Err(ViewError::type_mismatch(format!(
                "discriminator {}={} maps to {}, which is not a subtype of {}",
                discriminator.name, discriminator.value, ty, base
            )));
        }
        Ok(ty.clone())
    }
}
