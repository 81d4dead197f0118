use super::{Node, NodeKind};

/// Double dispatch over node variants
///
/// `S` is whatever state the traversal threads through (the owning model
/// during generation, the trigger event during application).
pub trait NodeVisitor<'n, S> {
    type Output;

    fn visit_value(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_url(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_object(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_reference(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_envelope(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_subtype(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_splice(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_meta(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_array_of_values(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_array_of_objects(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_array_of_references(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_map_of_values(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_map_of_objects(&mut self, node: &'n Node, state: S) -> Self::Output;
    fn visit_map_of_references(&mut self, node: &'n Node, state: S) -> Self::Output;
}

impl Node {
    pub fn accept<'n, S, V>(&'n self, visitor: &mut V, state: S) -> V::Output
    where
        V: NodeVisitor<'n, S> + ?Sized,
    {
        match self.kind {
            NodeKind::Value => visitor.visit_value(self, state),
            NodeKind::Url => visitor.visit_url(self, state),
            NodeKind::Object => visitor.visit_object(self, state),
            NodeKind::Reference => visitor.visit_reference(self, state),
            NodeKind::Envelope => visitor.visit_envelope(self, state),
            NodeKind::Subtype => visitor.visit_subtype(self, state),
            NodeKind::Splice => visitor.visit_splice(self, state),
            NodeKind::Meta => visitor.visit_meta(self, state),
            NodeKind::ArrayOfValues => visitor.visit_array_of_values(self, state),
            NodeKind::ArrayOfObjects => visitor.visit_array_of_objects(self, state),
            NodeKind::ArrayOfReferences => visitor.visit_array_of_references(self, state),
            NodeKind::MapOfValues => visitor.visit_map_of_values(self, state),
            NodeKind::MapOfObjects => visitor.visit_map_of_objects(self, state),
            NodeKind::MapOfReferences => visitor.visit_map_of_references(self, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts nodes per kind, descending into children
    struct KindCounter(Vec<NodeKind>);

    impl KindCounter {
        fn record(&mut self, node: &Node) {
            self.0.push(node.kind());
            for child in node.child_nodes() {
                child.accept(self, ());
            }
        }
    }

    impl<'n> NodeVisitor<'n, ()> for KindCounter {
        type Output = ();

        fn visit_value(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_url(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_object(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_reference(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_envelope(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_subtype(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_splice(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_meta(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_array_of_values(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_array_of_objects(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_array_of_references(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_map_of_values(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_map_of_objects(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
        fn visit_map_of_references(&mut self, node: &'n Node, _: ()) {
            self.record(node)
        }
    }

    #[test]
    fn test_accept_dispatches_by_kind() {
        let tree = Node::root("Person")
            .child(Node::value("name"))
            .child(Node::array_of_values("tags"))
            .child(
                Node::array_of_objects("pets", "Pet")
                    .discriminated()
                    .child(Node::subtype("Dog").child(Node::value("breed"))),
            );

        let mut counter = KindCounter(Vec::new());
        tree.accept(&mut counter, ());

        assert_eq!(
            counter.0,
            vec![
                NodeKind::Object,
                NodeKind::Value,
                NodeKind::ArrayOfValues,
                NodeKind::ArrayOfObjects,
                NodeKind::Subtype,
                NodeKind::Value,
            ]
        );
    }
}
