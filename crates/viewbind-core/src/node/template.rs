use std::collections::HashSet;

use super::{Node, NodeKind};
use crate::errors::{Result, ViewError};

/// A validated, immutable template tree
///
/// Safe to share between threads; every generation and application call
/// borrows it read-only.
#[derive(Debug, Clone)]
pub struct Template {
    root: Node,
}

impl Template {
    /// Validate `root` and freeze it
    ///
    /// Checks, in tree order, and fails on the first violation:
    ///
    /// 1. The root is an object node
    /// 2. Every node below the root has a name, except subtype wrappers
    /// 3. Object-shaped nodes (objects, references, their collections and
    ///    subtypes) declare a `model_type`
    /// 4. Leaf nodes (values, urls, splices, metas, value collections) have no children
    /// 5. A subtype sits below a discriminated container
    /// 6. Splice nodes have a handler and meta nodes a provider
    /// 7. No container has two children answering to the same name and namespace
    ///
    /// # Errors
    ///
    /// Returns `Configuration` with the path of the offending node.
    pub fn new(root: Node) -> Result<Self> {
        if root.kind() != NodeKind::Object {
            return Err(ViewError::configuration(format!(
                "template root must be an object, found {:?}",
                root.kind()
            ))
            .at("/"));
        }
        check_node(&root, "", true, false)?;
        tracing::debug!(root = %root.label(), "template validated");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

fn check_node(node: &Node, parent_path: &str, is_root: bool, discriminated: bool) -> Result<()> {
    let path = match node.name() {
        Some(name) => format!("{}/{}", parent_path, name),
        None if is_root => String::new(),
        None => format!("{}/{}", parent_path, node.label()),
    };
    let fail = |reason: String| Err(ViewError::configuration(reason).at(display(&path)));
    let kind = node.kind();

    if !is_root && node.name().is_none() && kind != NodeKind::Subtype {
        return fail(format!("{:?} node needs a name", kind));
    }
    if kind.is_object_shaped() && node.model_type().is_none() {
        return fail(format!("{:?} node needs a model type", kind));
    }
    if kind.is_leaf() && !node.child_nodes().is_empty() {
        return fail(format!("{:?} node cannot have children", kind));
    }
    if kind == NodeKind::Subtype && !discriminated {
        return fail("subtype declared without a discriminated container".to_string());
    }
    if kind == NodeKind::Splice && node.attributes().splice_handler.is_none() {
        return fail("splice node needs a handler".to_string());
    }
    if kind == NodeKind::Meta && node.attributes().meta_provider.is_none() {
        return fail("meta node needs a provider".to_string());
    }
    if let Some(duplicate) = find_duplicate_child(node) {
        return fail(format!("duplicate child '{}'", duplicate));
    }

    // Subtypes share their container's discriminator; envelopes and other
    // containers start over with their own flag.
    let child_discriminated = match kind {
        NodeKind::Subtype => discriminated,
        _ => node.attributes().discriminated,
    };
    for child in node.child_nodes() {
        check_node(child, &path, false, child_discriminated)?;
    }
    Ok(())
}

/// Names visible in one container, looking through subtype wrappers
///
/// Subtypes may legitimately redeclare each other's properties, so only
/// clashes within the same level are reported.
fn find_duplicate_child(node: &Node) -> Option<String> {
    let mut seen = HashSet::new();
    node.child_nodes()
        .iter()
        .filter(|c| !c.is_subtype())
        .filter_map(|c| c.name().map(|n| (n, c.namespace())))
        .find(|key| !seen.insert(*key))
        .map(|(name, _)| name.to_string())
}

fn display(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
