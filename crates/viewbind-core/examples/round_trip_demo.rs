//! Round-trip Demonstration
//!
//! Generates a view from a small object graph, edits it, and applies it back.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Key concepts illustrated:
//! 1. Templates as trees of typed nodes
//! 2. Polymorphic properties with discriminators
//! 3. Updating an existing graph with keyed collections
//! 4. Strict vs lenient handling of undeclared properties

use viewbind_core::logging_facility::{init, Profile};
use viewbind_core::{
    create_from_view, generate_view, update_from_view, Bean, Context, Event,
    KeyedAssociationManager, ModelValue, Node, ObjectRef, Template, TypeRegistry, ViewConfig,
    ViewOptions,
};

fn template() -> Result<Template, Box<dyn std::error::Error>> {
    let template = Template::new(
        Node::root("Owner")
            .child(Node::value("name"))
            .child(
                Node::object("pet", "Animal")
                    .discriminated()
                    .child(Node::value("name"))
                    .child(Node::subtype("Dog").child(Node::value("breed")))
                    .child(Node::subtype("Cat").child(Node::value("lives"))),
            )
            .child(
                Node::array_of_objects("toys", "Toy")
                    .with_association_manager(KeyedAssociationManager::new("label"))
                    .child(Node::value("label"))
                    .child(Node::value("squeaks")),
            ),
    )?;
    Ok(template)
}

fn print_view(view: &[Event]) {
    for event in view {
        println!("  {}", event);
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== viewbind Round-trip Demo ===\n");

    let types = TypeRegistry::new()
        .with_abstract("Animal")
        .with_subtype("Dog", "Animal")
        .with_subtype("Cat", "Animal");
    let config = ViewConfig::new().with_types(types);
    let template = template()?;

    // ===== Part 1: Generation =====
    println!("## Part 1: Generation\n");

    let ball = ObjectRef::new(Bean::new("Toy").with("label", "ball").with("squeaks", false));
    let owner = ObjectRef::new(
        Bean::new("Owner")
            .with("name", "Ada")
            .with(
                "pet",
                ObjectRef::new(Bean::new("Dog").with("name", "Rex").with("breed", "Beagle")),
            )
            .with("toys", vec![ModelValue::from(ball.clone())]),
    );

    let mut ctx = Context::new(&config);
    let view = generate_view(&template, &owner.clone().into(), &mut ctx)?;
    print_view(&view);

    // ===== Part 2: Creating a copy =====
    println!("## Part 2: Creating a copy\n");

    let copy = create_from_view(&template, view.clone(), &mut ctx)?.expect("view is not empty");
    assert_eq!(copy, owner);
    assert!(!copy.same_instance(&owner));
    println!("✓ Copy is structurally equal and a distinct instance\n");

    // ===== Part 3: Updating in place =====
    println!("## Part 3: Updating in place\n");

    let edited = vec![
        Event::begin_object(None),
        Event::begin_array(Some("toys")),
        Event::begin_object(None),
        Event::value(Some("label"), "ball"),
        Event::value(Some("squeaks"), true),
        Event::end_object(None),
        Event::begin_object(None),
        Event::value(Some("label"), "rope"),
        Event::end_object(None),
        Event::end_array(Some("toys")),
        Event::end_object(None),
    ];
    update_from_view(&template, edited, &owner, &mut ctx)?;

    assert_eq!(ball.get("squeaks"), ModelValue::Bool(true));
    println!("✓ Existing toy kept its identity and now squeaks");
    println!("✓ Name untouched: {:?}\n", owner.get("name"));

    // ===== Part 4: Undeclared properties =====
    println!("## Part 4: Undeclared properties\n");

    let extra = vec![
        Event::begin_object(None),
        Event::value(Some("name"), "Grace"),
        Event::value(Some("nickname"), "Amazing"),
        Event::end_object(None),
    ];
    match create_from_view(&template, extra.clone(), &mut ctx) {
        Err(err) => println!("Strict: {}", err),
        Ok(_) => println!("Strict: unexpectedly accepted"),
    }

    let lenient = ViewConfig::new().with_options(ViewOptions::lenient());
    let mut ctx = Context::new(&lenient);
    let grace = create_from_view(&template, extra, &mut ctx)?.expect("view is not empty");
    println!("Lenient: created {:?}\n", grace.get("name"));

    println!("=== Demo Complete ===");
    Ok(())
}
