use crate::errors::{Result, ViewError};

use super::types::{TypeName, TypeRegistry};
use super::value::{Bean, ObjectRef};

/// Constructs fresh model instances for the "create" path
///
/// The update path never calls the factory for objects that already exist
/// in the target graph.
pub trait ModelFactory: Send + Sync {
    /// Create an empty instance of `ty`
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when `ty` cannot be instantiated.
    fn create(&self, ty: &TypeName, types: &TypeRegistry) -> Result<ObjectRef>;
}

/// Default factory: an empty [`Bean`] of the requested type
#[derive(Debug, Clone, Copy, Default)]
pub struct BeanFactory;

impl ModelFactory for BeanFactory {
    fn create(&self, ty: &TypeName, types: &TypeRegistry) -> Result<ObjectRef> {
        if types.is_abstract(ty) {
            return Err(ViewError::configuration(format!(
                "type {} is abstract and cannot be instantiated",
                ty
            )));
        }
        tracing::trace!(type_name = %ty, "creating model object");
        Ok(ObjectRef::new(Bean::new(ty.clone())))
    }
}
