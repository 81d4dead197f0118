//! Listener chain hooks
//!
//! Listeners can veto nodes and collection elements, or substitute values,
//! in both directions. A veto is not an error: the vetoed node or element is
//! simply absent from the output (generation) or from the staged entity
//! (application).

use std::collections::HashSet;
use std::fmt;

use crate::context::Context;
use crate::model::ModelValue;
use crate::node::Node;

/// Position of an element within an array or map node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKey<'k> {
    Index(usize),
    Key(&'k str),
}

impl fmt::Display for ElementKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKey::Index(i) => write!(f, "[{}]", i),
            ElementKey::Key(k) => f.write_str(k),
        }
    }
}

/// Hooks invoked during generation and application
///
/// Every hook has a pass-through default, so listeners implement only what
/// they need. The chain runs in registration order and the first veto wins.
pub trait ViewListener: Send + Sync {
    /// Called after the node's frame is pushed; `false` skips the node
    fn should_visit_node(&self, _node: &Node, _ctx: &Context<'_>) -> bool {
        true
    }

    /// Called per collection element; `element` is `None` during application
    fn before_visit_element(
        &self,
        _node: &Node,
        _key: ElementKey<'_>,
        _element: Option<&ModelValue>,
        _ctx: &Context<'_>,
    ) -> bool {
        true
    }

    /// May substitute the model of an element before it is generated
    fn on_extract_element(
        &self,
        _node: &Node,
        _key: ElementKey<'_>,
        element: ModelValue,
        _ctx: &Context<'_>,
    ) -> ModelValue {
        element
    }

    /// May substitute a raw value read by an accessor
    fn on_extract_value(&self, _node: &Node, value: ModelValue, _ctx: &Context<'_>) -> ModelValue {
        value
    }

    /// May substitute a converted value before it is written
    fn on_inject_value(&self, _node: &Node, value: ModelValue, _ctx: &Context<'_>) -> ModelValue {
        value
    }
}

/// Vetoes nodes by their traversal path, e.g. `/person/ssn`
///
/// Element frames are part of the path, so `/people/[1]/ssn` hides one
/// element's property while `/people` hides the whole collection.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    hidden: HashSet<String>,
}

impl PathFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide(mut self, path: impl Into<String>) -> Self {
        self.hidden.insert(path.into());
        self
    }
}

impl ViewListener for PathFilter {
    fn should_visit_node(&self, _node: &Node, ctx: &Context<'_>) -> bool {
        !self.hidden.contains(&ctx.path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;

    #[test]
    fn test_element_key_display() {
        assert_eq!(ElementKey::Index(2).to_string(), "[2]");
        assert_eq!(ElementKey::Key("home").to_string(), "home");
    }

    #[test]
    fn test_path_filter_matches_current_path() {
        let config = ViewConfig::new();
        let mut ctx = Context::new(&config);
        let root = Node::root("Person");
        let ssn = Node::value("ssn");
        let filter = PathFilter::new().hide("/ssn");

        ctx.push_node(&root);
        assert!(filter.should_visit_node(&root, &ctx));
        ctx.push_node(&ssn);
        assert!(!filter.should_visit_node(&ssn, &ctx));
    }
}
