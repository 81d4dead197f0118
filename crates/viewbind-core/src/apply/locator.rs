//! Hierarchical child lookup
//!
//! Incoming properties are matched against children declared inside subtype
//! wrappers first (most derived applicable subtype wins), then against the
//! container's direct children.

use crate::model::{TypeName, TypeRegistry};
use crate::node::Node;

/// Find the child of `container` that consumes a property called `name`
///
/// `concrete` is the staged entity's type after discriminator resolution;
/// only subtype wrappers whose type is a supertype-or-equal of it apply.
pub(crate) fn locate<'t>(
    container: &'t Node,
    concrete: Option<&TypeName>,
    name: &str,
    namespace: Option<&str>,
    types: &TypeRegistry,
) -> Option<&'t Node> {
    if let Some(concrete) = concrete {
        let mut best = None;
        search_subtypes(container, concrete, name, namespace, types, &mut best);
        if let Some((_, found)) = best {
            return Some(found);
        }
    }
    direct_child(container, name, namespace)
}

/// Names a container accepts for an entity of type `concrete`
pub(crate) fn known_names(
    container: &Node,
    concrete: Option<&TypeName>,
    types: &TypeRegistry,
) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(container, concrete, types, &mut names);
    names
}

fn direct_child<'t>(container: &'t Node, name: &str, namespace: Option<&str>) -> Option<&'t Node> {
    container
        .child_nodes()
        .iter()
        .find(|c| !c.is_subtype() && c.matches(name, namespace))
}

fn applicable_subtypes<'t, 'q>(
    container: &'t Node,
    concrete: &'q TypeName,
    types: &'q TypeRegistry,
) -> impl Iterator<Item = (usize, &'t Node)> + 'q
where
    't: 'q,
{
    container
        .child_nodes()
        .iter()
        .filter(|c| c.is_subtype())
        .filter_map(move |sub| {
            sub.model_type()
                .and_then(|ty| types.distance(concrete, ty))
                .map(|distance| (distance, sub))
        })
}

fn search_subtypes<'t>(
    container: &'t Node,
    concrete: &TypeName,
    name: &str,
    namespace: Option<&str>,
    types: &TypeRegistry,
    best: &mut Option<(usize, &'t Node)>,
) {
    for (distance, sub) in applicable_subtypes(container, concrete, types) {
        if let Some(found) = direct_child(sub, name, namespace) {
            if best.map_or(true, |(d, _)| distance < d) {
                *best = Some((distance, found));
            }
        }
        search_subtypes(sub, concrete, name, namespace, types, best);
    }
}

fn collect_names(
    container: &Node,
    concrete: Option<&TypeName>,
    types: &TypeRegistry,
    names: &mut Vec<String>,
) {
    for child in container.child_nodes().iter().filter(|c| !c.is_subtype()) {
        if let Some(name) = child.name() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    if let Some(concrete) = concrete {
        for (_, sub) in applicable_subtypes(container, concrete, types) {
            collect_names(sub, Some(concrete), types, names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn pets() -> Node {
        Node::object("pet", "Animal")
            .discriminated()
            .child(Node::value("name"))
            .child(Node::value("sound"))
            .child(
                Node::subtype("Dog")
                    .child(Node::value("breed"))
                    .child(Node::subtype("Puppy").child(Node::array_of_values("sound"))),
            )
            .child(Node::subtype("Cat").child(Node::value("lives")))
    }

    fn types() -> TypeRegistry {
        TypeRegistry::new()
            .with_subtype("Dog", "Animal")
            .with_subtype("Puppy", "Dog")
            .with_subtype("Cat", "Animal")
    }

    #[test]
    fn test_subtype_children_only_for_matching_type() {
        let node = pets();
        let types = types();
        assert!(locate(&node, Some(&"Dog".into()), "breed", None, &types).is_some());
        assert!(locate(&node, Some(&"Cat".into()), "breed", None, &types).is_none());
        assert!(locate(&node, Some(&"Animal".into()), "breed", None, &types).is_none());
        assert!(locate(&node, Some(&"Puppy".into()), "breed", None, &types).is_some());
    }

    #[test]
    fn test_most_derived_subtype_wins_over_direct_child() {
        let node = pets();
        let types = types();
        let puppy = locate(&node, Some(&"Puppy".into()), "sound", None, &types).unwrap();
        assert_eq!(puppy.kind(), NodeKind::ArrayOfValues);
        let dog = locate(&node, Some(&"Dog".into()), "sound", None, &types).unwrap();
        assert_eq!(dog.kind(), NodeKind::Value);
    }

    #[test]
    fn test_known_names() {
        let node = pets();
        let names = known_names(&node, Some(&"Puppy".into()), &types());
        assert_eq!(names, vec!["name", "sound", "breed"]);
        let names = known_names(&node, Some(&"Cat".into()), &types());
        assert_eq!(names, vec!["name", "sound", "lives"]);
    }
}
