//! Computed, read-only view values

use crate::context::Context;
use crate::errors::Result;
use crate::model::ModelValue;
use crate::node::Node;

/// Computes the value of a meta node from the model that owns it
///
/// Meta values appear in generated views only; application reads and
/// discards them.
pub trait MetaProvider: Send + Sync {
    /// # Errors
    ///
    /// Implementations report their own failures; the engine attaches the path.
    fn compute(&self, node: &Node, owner: &ModelValue, ctx: &Context<'_>) -> Result<ModelValue>;
}

/// Runtime type name of the owning object
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeNameMeta;

impl MetaProvider for TypeNameMeta {
    fn compute(&self, _node: &Node, owner: &ModelValue, _ctx: &Context<'_>) -> Result<ModelValue> {
        Ok(owner
            .type_name()
            .map_or(ModelValue::Null, |ty| ModelValue::Text(ty.to_string())))
    }
}
