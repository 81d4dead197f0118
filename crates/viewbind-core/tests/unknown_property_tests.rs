#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Strict vs lenient handling of properties the template does not declare

mod common;

use common::*;
use viewbind_core::{
    create_from_view, update_from_view, Bean, Context, Event, ExError, ExErrorKind, ModelValue,
    ObjectRef, ViewError, ViewOptions, ViewValue,
};

fn view_with_extras() -> Vec<Event> {
    vec![
        Event::begin_object(None),
        Event::value(Some("name"), "Ada"),
        Event::value(Some("nickname"), "Countess"),
        Event::begin_object(Some("meta")),
        Event::begin_array(Some("history")),
        Event::value(None, 1i64),
        Event::begin_object(None),
        Event::value(Some("name"), "nested name must not leak"),
        Event::end_object(None),
        Event::end_array(Some("history")),
        Event::end_object(Some("meta")),
        Event::value(Some("age"), 36i64),
        Event::begin_object(Some("address")),
        Event::value(Some("city"), "London"),
        Event::value(Some("zip"), ViewValue::Null),
        Event::end_object(Some("address")),
        Event::end_object(None),
    ]
}

#[test]
fn test_unknown_property_fails_by_default() {
    // GIVEN a strict configuration
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);

    // WHEN creating from a view with an undeclared field
    let err = create_from_view(&template, view_with_extras(), &mut ctx).unwrap_err();

    // THEN the error names the container and the property
    let ex: ExError = err.clone().into();
    assert_eq!(ex.kind(), ExErrorKind::UnknownProperty);
    assert_eq!(ex.code(), "ERR_UNKNOWN_PROPERTY");
    assert_eq!(ex.property(), Some("nickname"));
    assert_eq!(ex.path(), Some("/"));
    let candidates = ex.candidates().unwrap();
    assert!(candidates.contains(&"address".to_string()));
    assert!(err.to_string().contains("nickname"));
}

#[test]
fn test_lenient_mode_skips_whole_subtrees() {
    // GIVEN a lenient configuration
    let template = simple_person_template();
    let config = lenient_config();
    let mut ctx = Context::new(&config);

    // WHEN creating from the same view
    let person = create_from_view(&template, view_with_extras(), &mut ctx)
        .unwrap()
        .unwrap();

    // THEN every recognized field is applied
    assert_eq!(person.get("name"), ModelValue::from("Ada"));
    assert_eq!(person.get("age"), ModelValue::Int(36));
    let address = person.get("address");
    assert_eq!(
        address.as_object().unwrap().get("city"),
        ModelValue::from("London")
    );

    // AND nothing from the skipped subtrees leaks into the model
    assert!(!person.has("nickname"));
    assert!(!person.has("meta"));
    assert!(!address.as_object().unwrap().has("zip"));
}

#[test]
fn test_options_loaded_from_json() {
    // GIVEN options read from a configuration document
    let options = ViewOptions::from_json(r#"{ "ignore_unknown_properties": true }"#).unwrap();
    assert!(options.validate_generated_views);
    let config = demo_config().with_options(options);

    // WHEN updating with an extra field
    let template = simple_person_template();
    let mut ctx = Context::new(&config);
    let target = ObjectRef::new(Bean::new("Person").with("name", "Old"));
    update_from_view(&template, view_with_extras(), &target, &mut ctx).unwrap();

    // THEN the update is applied
    assert_eq!(target.get("name"), ModelValue::from("Ada"));
}

#[test]
fn test_bad_option_document_is_serialization_error() {
    let err = ViewOptions::from_json(r#"{ "ignore_unknown_properties": "yes" }"#).unwrap_err();
    assert!(matches!(err, ViewError::Serialization { .. }));
}
