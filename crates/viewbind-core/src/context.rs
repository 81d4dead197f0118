//! Per-call traversal state
//!
//! One [`Context`] exists per top-level generate or apply call. It is never
//! shared between calls; the template and configuration it borrows are.

use std::collections::HashMap;
use std::sync::Arc;

use viewbind_core_types::RequestContext;

use crate::config::{ViewConfig, ViewOptions};
use crate::converter::{ScalarConverter, ValueConverter};
use crate::discriminator::DiscriminatorStrategy;
use crate::listener::{ElementKey, ViewListener};
use crate::model::{ModelValue, TypeName};
use crate::node::Node;
use crate::reference::ReferenceResolver;

static SCALAR: ScalarConverter = ScalarConverter;

/// One step of the traversal path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFrame {
    pub name: Option<String>,
    pub model_type: Option<TypeName>,
}

/// Mutable state of one traversal
pub struct Context<'a> {
    config: &'a ViewConfig,
    resolver: Option<&'a dyn ReferenceResolver>,
    request: RequestContext,
    path: Vec<PathFrame>,
    scope: Vec<ModelValue>,
    named: HashMap<String, ModelValue>,
    listeners: Vec<Arc<dyn ViewListener>>,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a ViewConfig) -> Self {
        Self {
            config,
            resolver: None,
            request: RequestContext::new(),
            path: Vec::new(),
            scope: Vec::new(),
            named: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn ReferenceResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    /// Listener for this call only; runs after configured and node-local ones
    pub fn with_listener(mut self, listener: impl ViewListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn config(&self) -> &'a ViewConfig {
        self.config
    }

    pub fn options(&self) -> &'a ViewOptions {
        &self.config.options
    }

    pub fn resolver(&self) -> Option<&'a dyn ReferenceResolver> {
        self.resolver
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    // ----- path -----

    pub fn push_node(&mut self, node: &Node) {
        self.path.push(PathFrame {
            name: node.name().map(str::to_string),
            model_type: node.model_type().cloned(),
        });
    }

    /// Push a frame for one collection element
    pub fn push_element(&mut self, key: ElementKey<'_>, model_type: Option<&TypeName>) {
        self.path.push(PathFrame {
            name: Some(key.to_string()),
            model_type: model_type.cloned(),
        });
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn frames(&self) -> &[PathFrame] {
        &self.path
    }

    /// Names from the root joined by `/`; unnamed frames are left out
    pub fn path_string(&self) -> String {
        let names: Vec<&str> = self.path.iter().filter_map(|f| f.name.as_deref()).collect();
        format!("/{}", names.join("/"))
    }

    // ----- ambient models -----

    pub fn enter_scope(&mut self, model: ModelValue) {
        self.scope.push(model);
    }

    pub fn exit_scope(&mut self) {
        self.scope.pop();
    }

    /// Model currently being traversed
    pub fn current(&self) -> Option<&ModelValue> {
        self.scope.last()
    }

    /// Innermost enclosing model that is an instance of `ty`
    pub fn find_in_scope(&self, ty: &TypeName) -> Option<&ModelValue> {
        self.scope
            .iter()
            .rev()
            .find(|m| self.config.types.is_instance_of(m, ty))
    }

    pub fn put(&mut self, name: impl Into<String>, value: ModelValue) {
        self.named.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ModelValue> {
        self.named.get(name)
    }

    // ----- strategies -----

    /// Node converter, else the first configured converter that supports the
    /// node's data type, else the built-in scalar converter
    pub fn converter_for<'n>(&self, node: &'n Node) -> &'n dyn ValueConverter
    where
        'a: 'n,
    {
        if let Some(converter) = &node.attributes().converter {
            return converter.as_ref();
        }
        let data_type = node.data_type();
        self.config
            .converters()
            .iter()
            .find(|c| c.supports(&data_type))
            .map_or(&SCALAR as &dyn ValueConverter, |c| c.as_ref())
    }

    pub fn discriminator_strategy_for<'n>(&self, node: &'n Node) -> &'n dyn DiscriminatorStrategy
    where
        'a: 'n,
    {
        match &node.attributes().discriminator_strategy {
            Some(strategy) => strategy.as_ref(),
            None => self.config.discriminator_strategy(),
        }
    }

    // ----- listener chain -----

    fn chain<'s>(&'s self, node: &'s Node) -> impl Iterator<Item = &'s Arc<dyn ViewListener>> {
        self.config
            .listeners()
            .iter()
            .chain(node.attributes().listeners.iter())
            .chain(self.listeners.iter())
    }

    pub fn should_visit_node(&self, node: &Node) -> bool {
        self.chain(node).all(|l| l.should_visit_node(node, self))
    }

    pub fn before_visit_element(
        &self,
        node: &Node,
        key: ElementKey<'_>,
        element: Option<&ModelValue>,
    ) -> bool {
        self.chain(node)
            .all(|l| l.before_visit_element(node, key, element, self))
    }

    pub fn on_extract_element(
        &self,
        node: &Node,
        key: ElementKey<'_>,
        element: ModelValue,
    ) -> ModelValue {
        self.chain(node)
            .fold(element, |e, l| l.on_extract_element(node, key, e, self))
    }

    pub fn on_extract_value(&self, node: &Node, value: ModelValue) -> ModelValue {
        self.chain(node)
            .fold(value, |v, l| l.on_extract_value(node, v, self))
    }

    pub fn on_inject_value(&self, node: &Node, value: ModelValue) -> ModelValue {
        self.chain(node)
            .fold(value, |v, l| l.on_inject_value(node, v, self))
    }
}
