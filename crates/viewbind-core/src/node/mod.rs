//! Template nodes
//!
//! A template is a tree of [`Node`]s built once at configuration time and
//! shared read-only by every generation and application call. Behavior is
//! layered onto the fixed set of variants through [`NodeVisitor`].

mod template;
mod visitor;

pub use template::Template;
pub use visitor::NodeVisitor;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::accessor::{Accessor, PropertyAccessor};
use crate::association::AssociationManager;
use crate::converter::{DataType, ValueConverter};
use crate::discriminator::DiscriminatorStrategy;
use crate::errors::{Result, ViewError};
use crate::listener::ViewListener;
use crate::meta::MetaProvider;
use crate::model::TypeName;
use crate::splice::SpliceHandler;

/// Node variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Value,
    Url,
    Object,
    Reference,
    Envelope,
    Subtype,
    Splice,
    Meta,
    ArrayOfValues,
    ArrayOfObjects,
    ArrayOfReferences,
    MapOfValues,
    MapOfObjects,
    MapOfReferences,
}

impl NodeKind {
    /// Variants that never own children
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::Value
                | NodeKind::Url
                | NodeKind::Splice
                | NodeKind::Meta
                | NodeKind::ArrayOfValues
                | NodeKind::MapOfValues
        )
    }

    /// Variants whose children describe a model object and so need a `model_type`
    pub fn is_object_shaped(self) -> bool {
        matches!(
            self,
            NodeKind::Object
                | NodeKind::Reference
                | NodeKind::Subtype
                | NodeKind::ArrayOfObjects
                | NodeKind::ArrayOfReferences
                | NodeKind::MapOfObjects
                | NodeKind::MapOfReferences
        )
    }

    pub fn is_reference(self) -> bool {
        matches!(
            self,
            NodeKind::Reference | NodeKind::ArrayOfReferences | NodeKind::MapOfReferences
        )
    }
}

/// Whether a node takes part in generation, injection, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl AccessMode {
    pub fn can_read(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

/// Strategies and flags attached to a node
#[derive(Clone, Default)]
pub struct NodeAttributes {
    pub converter: Option<Arc<dyn ValueConverter>>,
    pub data_type: Option<DataType>,
    pub discriminated: bool,
    pub discriminator_strategy: Option<Arc<dyn DiscriminatorStrategy>>,
    pub listeners: Vec<Arc<dyn ViewListener>>,
    pub association_manager: Option<Arc<dyn AssociationManager>>,
    pub splice_handler: Option<Arc<dyn SpliceHandler>>,
    pub meta_provider: Option<Arc<dyn MetaProvider>>,
    pub tolerate_unresolved: bool,
    /// Free-form attributes for application-specific strategies
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl fmt::Debug for NodeAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAttributes")
            .field("converter", &self.converter.is_some())
            .field("data_type", &self.data_type)
            .field("discriminated", &self.discriminated)
            .field("listeners", &self.listeners.len())
            .field("association_manager", &self.association_manager.is_some())
            .field("splice_handler", &self.splice_handler.is_some())
            .field("meta_provider", &self.meta_provider.is_some())
            .field("tolerate_unresolved", &self.tolerate_unresolved)
            .field("extras", &self.extras)
            .finish()
    }
}

/// One element of a template tree
#[derive(Clone)]
pub struct Node {
    name: Option<String>,
    namespace: Option<String>,
    model_type: Option<TypeName>,
    access: AccessMode,
    accessor: Option<Arc<dyn Accessor>>,
    attributes: NodeAttributes,
    kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    /// Bare node; named property nodes get a [`PropertyAccessor`] for their name
    pub fn new(kind: NodeKind, name: Option<&str>, model_type: Option<TypeName>) -> Self {
        let binds_property = !matches!(kind, NodeKind::Envelope | NodeKind::Subtype);
        let accessor: Option<Arc<dyn Accessor>> = match name {
            Some(n) if binds_property => Some(Arc::new(PropertyAccessor::new(n))),
            _ => None,
        };
        Self {
            name: name.map(str::to_string),
            namespace: None,
            model_type,
            access: AccessMode::default(),
            accessor,
            attributes: NodeAttributes::default(),
            kind,
            children: Vec::new(),
        }
    }

    /// Unnamed object node that binds the model passed to the engine
    pub fn root(model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::Object, None, Some(model_type.into()))
    }

    pub fn value(name: &str) -> Self {
        Self::new(NodeKind::Value, Some(name), None)
    }

    pub fn url(name: &str) -> Self {
        Self::new(NodeKind::Url, Some(name), None).with_data_type(DataType::Url)
    }

    pub fn object(name: &str, model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::Object, Some(name), Some(model_type.into()))
    }

    pub fn reference(name: &str, model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::Reference, Some(name), Some(model_type.into()))
    }

    /// Structural nesting with no model property behind it
    pub fn envelope(name: &str) -> Self {
        Self::new(NodeKind::Envelope, Some(name), None)
    }

    pub fn subtype(model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::Subtype, None, Some(model_type.into()))
    }

    pub fn splice(name: &str, handler: impl SpliceHandler + 'static) -> Self {
        let mut node = Self::new(NodeKind::Splice, Some(name), None);
        node.attributes.splice_handler = Some(Arc::new(handler));
        node
    }

    pub fn meta(name: &str, provider: impl MetaProvider + 'static) -> Self {
        let mut node = Self::new(NodeKind::Meta, Some(name), None);
        node.attributes.meta_provider = Some(Arc::new(provider));
        node.access = AccessMode::Read;
        node
    }

    pub fn array_of_values(name: &str) -> Self {
        Self::new(NodeKind::ArrayOfValues, Some(name), None)
    }

    pub fn array_of_objects(name: &str, model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::ArrayOfObjects, Some(name), Some(model_type.into()))
    }

    pub fn array_of_references(name: &str, model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::ArrayOfReferences, Some(name), Some(model_type.into()))
    }

    pub fn map_of_values(name: &str) -> Self {
        Self::new(NodeKind::MapOfValues, Some(name), None)
    }

    pub fn map_of_objects(name: &str, model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::MapOfObjects, Some(name), Some(model_type.into()))
    }

    pub fn map_of_references(name: &str, model_type: impl Into<TypeName>) -> Self {
        Self::new(NodeKind::MapOfReferences, Some(name), Some(model_type.into()))
    }

    // ----- chaining -----

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    pub fn read_only(self) -> Self {
        self.with_access(AccessMode::Read)
    }

    pub fn write_only(self) -> Self {
        self.with_access(AccessMode::Write)
    }

    pub fn with_accessor(mut self, accessor: impl Accessor + 'static) -> Self {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    pub fn with_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.attributes.converter = Some(Arc::new(converter));
        self
    }

    /// Declared data type of the value, or of the elements for value collections
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.attributes.data_type = Some(data_type);
        self
    }

    /// Emit and expect a discriminator as the first child of each object
    pub fn discriminated(mut self) -> Self {
        self.attributes.discriminated = true;
        self
    }

    pub fn with_discriminator_strategy(
        mut self,
        strategy: impl DiscriminatorStrategy + 'static,
    ) -> Self {
        self.attributes.discriminated = true;
        self.attributes.discriminator_strategy = Some(Arc::new(strategy));
        self
    }

    pub fn with_listener(mut self, listener: impl ViewListener + 'static) -> Self {
        self.attributes.listeners.push(Arc::new(listener));
        self
    }

    pub fn with_association_manager(
        mut self,
        manager: impl AssociationManager + 'static,
    ) -> Self {
        self.attributes.association_manager = Some(Arc::new(manager));
        self
    }

    /// Inject null instead of failing when a reference cannot be resolved
    pub fn tolerate_unresolved(mut self) -> Self {
        self.attributes.tolerate_unresolved = true;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.extras.insert(key.into(), value);
        self
    }

    // ----- inspection -----

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn model_type(&self) -> Option<&TypeName> {
        self.model_type.as_ref()
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn attributes(&self) -> &NodeAttributes {
        &self.attributes
    }

    pub fn is_subtype(&self) -> bool {
        self.kind == NodeKind::Subtype
    }

    /// Name for diagnostics
    pub fn label(&self) -> String {
        match (&self.name, &self.model_type) {
            (Some(name), _) => name.clone(),
            (None, Some(ty)) => format!("<{}>", ty),
            (None, None) => format!("<{:?}>", self.kind),
        }
    }

    /// Without an accessor a node works on the model its parent passes in
    pub fn accessor(&self) -> Option<&dyn Accessor> {
        self.accessor.as_deref()
    }

    /// # Errors
    ///
    /// Returns `Configuration` when the node has no accessor.
    pub fn require_accessor(&self) -> Result<&dyn Accessor> {
        self.accessor().ok_or_else(|| {
            ViewError::configuration(format!("node {} has no accessor", self.label()))
        })
    }

    /// Declared data type, falling back to the accessor's
    pub fn data_type(&self) -> DataType {
        match (&self.attributes.data_type, &self.accessor) {
            (Some(dt), _) => dt.clone(),
            (None, Some(accessor)) => accessor.data_type(),
            (None, None) => DataType::Any,
        }
    }

    /// Whether an incoming event with this name and namespace addresses the node
    ///
    /// An event without a namespace matches any node namespace.
    pub fn matches(&self, name: &str, namespace: Option<&str>) -> bool {
        self.name.as_deref() == Some(name)
            && (namespace.is_none() || namespace == self.namespace.as_deref())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("model_type", &self.model_type)
            .field("access", &self.access)
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
