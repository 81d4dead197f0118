//! Engine configuration
//!
//! [`ViewOptions`] holds the plain, serializable switches; [`ViewConfig`]
//! bundles them with the strategy objects shared by every call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::association::{AssociationManager, ReplaceAssociationManager};
use crate::converter::ValueConverter;
use crate::discriminator::{DiscriminatorStrategy, TypeNameDiscriminatorStrategy};
use crate::errors::Result;
use crate::listener::ViewListener;
use crate::model::{BeanFactory, ModelFactory, TypeRegistry};

/// Behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Skip unknown properties (and their subtrees) instead of failing
    pub ignore_unknown_properties: bool,
    /// Inject null for references the resolver cannot find
    pub tolerate_unresolved_references: bool,
    /// Run the well-formedness check over every generated view
    pub validate_generated_views: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            ignore_unknown_properties: false,
            tolerate_unresolved_references: false,
            validate_generated_views: true,
        }
    }
}

impl ViewOptions {
    /// Options that skip unknown properties
    pub fn lenient() -> Self {
        Self {
            ignore_unknown_properties: true,
            ..Self::default()
        }
    }

    /// Load options from JSON; absent fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `Serialization` when the document is not valid JSON or has
    /// fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options plus shared strategies
#[derive(Clone)]
pub struct ViewConfig {
    pub options: ViewOptions,
    pub types: TypeRegistry,
    converters: Vec<Arc<dyn ValueConverter>>,
    listeners: Vec<Arc<dyn ViewListener>>,
    discriminator_strategy: Arc<dyn DiscriminatorStrategy>,
    association_manager: Arc<dyn AssociationManager>,
    factory: Arc<dyn ModelFactory>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            options: ViewOptions::default(),
            types: TypeRegistry::default(),
            converters: Vec::new(),
            listeners: Vec::new(),
            discriminator_strategy: Arc::new(TypeNameDiscriminatorStrategy::default()),
            association_manager: Arc::new(ReplaceAssociationManager),
            factory: Arc::new(BeanFactory),
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ViewOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Register a converter; earlier registrations win
    pub fn with_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    pub fn with_listener(mut self, listener: impl ViewListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn with_discriminator_strategy(
        mut self,
        strategy: impl DiscriminatorStrategy + 'static,
    ) -> Self {
        self.discriminator_strategy = Arc::new(strategy);
        self
    }

    pub fn with_association_manager(mut self, manager: impl AssociationManager + 'static) -> Self {
        self.association_manager = Arc::new(manager);
        self
    }

    pub fn with_factory(mut self, factory: impl ModelFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn converters(&self) -> &[Arc<dyn ValueConverter>] {
        &self.converters
    }

    pub fn listeners(&self) -> &[Arc<dyn ViewListener>] {
        &self.listeners
    }

    pub fn discriminator_strategy(&self) -> &dyn DiscriminatorStrategy {
        self.discriminator_strategy.as_ref()
    }

    pub fn association_manager(&self) -> &dyn AssociationManager {
        self.association_manager.as_ref()
    }

    pub fn factory(&self) -> &dyn ModelFactory {
        self.factory.as_ref()
    }
}

impl fmt::Debug for ViewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewConfig")
            .field("options", &self.options)
            .field("types", &self.types)
            .field("converters", &self.converters.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
