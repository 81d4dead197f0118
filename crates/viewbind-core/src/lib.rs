//! viewbind core: a bidirectional template engine
//!
//! A [`Template`] (an immutable tree of [`Node`]s) maps a dynamic object
//! graph to a canonical, format-agnostic sequence of [`Event`]s and back:
//!
//! - [`generate_view`] walks the template against a model and emits a view
//! - [`stage_view`] parses a view into a staged [`Entity`] without touching
//!   any model
//! - [`create_from_view`] / [`update_from_view`] stage a view and then
//!   inject it into a fresh or existing model, resolving references and
//!   reconciling collections
//!
//! Polymorphism is handled with discriminators and subtype nodes, shared
//! objects with reference nodes plus a [`ReferenceResolver`], and collection
//! identity with pluggable [`AssociationManager`]s. Listeners can veto nodes
//! and elements or substitute values in both directions.
//!
//! Wire codecs are out of scope; anything that can produce and consume the
//! event sequence can sit at the boundary.

pub mod accessor;
mod apply;
pub mod association;
pub mod config;
pub mod context;
pub mod converter;
pub mod discriminator;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod event;
mod generate;
pub mod listener;
pub mod logging_facility;
pub mod meta;
pub mod model;
pub mod node;
pub mod reference;
pub mod splice;

// Re-export commonly used types
pub use accessor::{Accessor, FnAccessor, PropertyAccessor};
pub use association::{
    AssociationManager, ElementSync, KeyedAssociationManager, ReplaceAssociationManager,
};
pub use config::{ViewConfig, ViewOptions};
pub use context::{Context, PathFrame};
pub use converter::{DataType, FnConverter, ScalarConverter, ValueConverter};
pub use discriminator::{
    Discriminator, DiscriminatorStrategy, MappedDiscriminatorStrategy,
    TypeNameDiscriminatorStrategy, DEFAULT_DISCRIMINATOR,
};
pub use engine::{create_from_view, generate_view, stage_view, update_from_view};
pub use entity::{Entity, Staged, StagedProperty};
pub use errors::{ExError, ExErrorKind, Result, ViewError};
pub use event::{validate, Event, EventCursor, EventKind, ViewValue};
pub use listener::{ElementKey, PathFilter, ViewListener};
pub use meta::{MetaProvider, TypeNameMeta};
pub use model::{Bean, BeanFactory, ModelFactory, ModelValue, ObjectRef, TypeName, TypeRegistry};
pub use node::{AccessMode, Node, NodeAttributes, NodeKind, NodeVisitor, Template};
pub use reference::{GraphReferenceResolver, ReferenceRequest, ReferenceResolver};
pub use splice::{DynamicSplice, SpliceHandler};
pub use viewbind_core_types::{RequestContext, RequestId, TraceId};
