//! Demo domain shared by the integration tests
//!
//! People with an address, a polymorphic pet (`Dog`/`Cat` under an abstract
//! `Animal`), tags, and a best friend held by reference; orders with lines
//! keyed by SKU.

use viewbind_core::{
    Bean, KeyedAssociationManager, ModelValue, Node, ObjectRef, Template, TypeRegistry,
    ViewConfig, ViewOptions,
};

/// Type hierarchy of the demo domain
#[allow(dead_code)]
pub fn demo_types() -> TypeRegistry {
    TypeRegistry::new()
        .with_abstract("Animal")
        .with_subtype("Dog", "Animal")
        .with_subtype("Cat", "Animal")
}

/// Strict configuration over the demo types
#[allow(dead_code)]
pub fn demo_config() -> ViewConfig {
    ViewConfig::new().with_types(demo_types())
}

/// Lenient configuration: unknown properties are skipped
#[allow(dead_code)]
pub fn lenient_config() -> ViewConfig {
    demo_config().with_options(ViewOptions::lenient())
}

/// Address sub-template
#[allow(dead_code)]
pub fn address_node() -> Node {
    Node::object("address", "Address")
        .child(Node::value("street"))
        .child(Node::value("city"))
}

/// Polymorphic pet sub-template
#[allow(dead_code)]
pub fn pet_node() -> Node {
    Node::object("pet", "Animal")
        .discriminated()
        .child(Node::value("name"))
        .child(Node::subtype("Dog").child(Node::value("breed")))
        .child(Node::subtype("Cat").child(Node::value("lives")))
}

/// Flat person: scalars and a nested address only
#[allow(dead_code)]
pub fn simple_person_template() -> Template {
    Template::new(
        Node::root("Person")
            .child(Node::value("name"))
            .child(Node::value("age"))
            .child(Node::value("active"))
            .child(address_node()),
    )
    .expect("simple person template is valid")
}

/// Full person template
#[allow(dead_code)]
pub fn person_template() -> Template {
    Template::new(
        Node::root("Person")
            .child(Node::value("id"))
            .child(Node::value("name"))
            .child(Node::value("age"))
            .child(address_node())
            .child(pet_node())
            .child(Node::array_of_values("tags")),
    )
    .expect("person template is valid")
}

#[allow(dead_code)]
pub fn address(street: &str, city: &str) -> ObjectRef {
    ObjectRef::new(
        Bean::new("Address")
            .with("street", street)
            .with("city", city),
    )
}

#[allow(dead_code)]
pub fn dog(name: &str, breed: &str) -> ObjectRef {
    ObjectRef::new(Bean::new("Dog").with("name", name).with("breed", breed))
}

#[allow(dead_code)]
pub fn cat(name: &str, lives: i64) -> ObjectRef {
    ObjectRef::new(Bean::new("Cat").with("name", name).with("lives", lives))
}

/// Person with every property of [`person_template`] set
#[allow(dead_code)]
pub fn ada() -> ObjectRef {
    ObjectRef::new(
        Bean::new("Person")
            .with("id", 1i64)
            .with("name", "Ada")
            .with("age", 36i64)
            .with("address", address("12 St James's Sq", "London"))
            .with("pet", dog("Rex", "Beagle"))
            .with("tags", vec![ModelValue::from("math"), ModelValue::from("engines")]),
    )
}

#[allow(dead_code)]
pub fn line(sku: &str, qty: i64) -> ObjectRef {
    ObjectRef::new(Bean::new("Line").with("sku", sku).with("qty", qty))
}

/// Order whose lines are reconciled by SKU
#[allow(dead_code)]
pub fn order_template() -> Template {
    Template::new(
        Node::root("Order").child(Node::value("number")).child(
            Node::array_of_objects("lines", "Line")
                .with_association_manager(KeyedAssociationManager::new("sku"))
                .child(Node::value("sku"))
                .child(Node::value("qty")),
        ),
    )
    .expect("order template is valid")
}

/// Same order shape with the default (replace) reconciliation
#[allow(dead_code)]
pub fn replace_order_template() -> Template {
    Template::new(
        Node::root("Order").child(Node::value("number")).child(
            Node::array_of_objects("lines", "Line")
                .child(Node::value("sku"))
                .child(Node::value("qty")),
        ),
    )
    .expect("order template is valid")
}

#[allow(dead_code)]
pub fn order(number: &str, lines: &[ObjectRef]) -> ObjectRef {
    let lines: Vec<ModelValue> = lines.iter().cloned().map(ModelValue::from).collect();
    ObjectRef::new(
        Bean::new("Order")
            .with("number", number)
            .with("lines", lines),
    )
}

/// Elements of a list property as object handles
#[allow(dead_code)]
pub fn objects(value: &ModelValue) -> Vec<ObjectRef> {
    value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}
