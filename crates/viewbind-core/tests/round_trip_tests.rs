#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Round trip: applying a generated view reproduces the model

mod common;

use common::*;
use proptest::prelude::*;
use viewbind_core::{
    create_from_view, generate_view, Bean, Context, Event, ModelValue, ObjectRef, ViewValue,
};

fn person(name: Option<String>, age: Option<i64>, active: Option<bool>, city: Option<String>) -> ObjectRef {
    let address = match city {
        Some(city) => ModelValue::from(address("1 Main St", &city)),
        None => ModelValue::Null,
    };
    ObjectRef::new(
        Bean::new("Person")
            .with("name", name)
            .with("age", age)
            .with("active", active)
            .with("address", address),
    )
}

proptest! {
    #[test]
    fn prop_flat_person_round_trips(
        name in proptest::option::of("[a-zA-Z ]{0,12}"),
        age in proptest::option::of(any::<i64>()),
        active in proptest::option::of(any::<bool>()),
        city in proptest::option::of("[a-zA-Z]{1,10}"),
    ) {
        let template = simple_person_template();
        let config = demo_config();
        let mut ctx = Context::new(&config);
        let source = person(name, age, active, city);

        let view = generate_view(&template, &source.clone().into(), &mut ctx).unwrap();
        let copy = create_from_view(&template, view, &mut ctx).unwrap().unwrap();

        prop_assert_eq!(copy, source);
    }
}

#[test]
fn test_null_nested_object_round_trips_as_null_value() {
    // GIVEN a person without an address
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let source = person(Some("Grace".into()), Some(85), Some(true), None);

    // WHEN generating a view
    let view = generate_view(&template, &source.clone().into(), &mut ctx).unwrap();

    // THEN the address subtree is a single null value
    assert!(view.contains(&Event::value(Some("address"), ViewValue::Null)));
    assert!(!view.contains(&Event::begin_object(Some("address"))));

    // AND applying it back yields an equal person with a null address
    let copy = create_from_view(&template, view, &mut ctx).unwrap().unwrap();
    assert_eq!(copy, source);
    assert!(copy.get("address").is_null());
}

#[test]
fn test_full_person_round_trips() {
    // GIVEN a person with every property set, including a polymorphic pet
    let template = person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let source = ada();

    // WHEN generating and applying the view
    let view = generate_view(&template, &source.clone().into(), &mut ctx).unwrap();
    let copy = create_from_view(&template, view, &mut ctx).unwrap().unwrap();

    // THEN the copy is structurally equal but a distinct graph
    assert_eq!(copy, source);
    assert!(!copy.same_instance(&source));
    let pet = copy.get("pet");
    assert!(!pet
        .as_object()
        .unwrap()
        .same_instance(source.get("pet").as_object().unwrap()));
}
