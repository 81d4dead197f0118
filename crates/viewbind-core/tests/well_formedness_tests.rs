#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Generated views are balanced; malformed views are rejected

mod common;

use common::*;
use viewbind_core::{
    create_from_view, generate_view, stage_view, update_from_view, validate, Bean, Context, Event,
    EventKind, ExError, ExErrorKind, ModelValue, ObjectRef, ViewError,
};

#[test]
fn test_generated_view_is_balanced() {
    // GIVEN the full person template and model
    let template = person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);

    // WHEN generating
    let view = generate_view(&template, &ada().into(), &mut ctx).unwrap();

    // THEN every begin has exactly one matching end at the right depth
    assert!(validate(&view).is_ok());
    let mut open: Vec<&Event> = Vec::new();
    for event in &view {
        if event.kind.is_begin() {
            open.push(event);
        } else if event.kind.is_end() {
            let opener = open.pop().expect("end without begin");
            assert!(opener.is_closed_by(event), "{} closed by {}", opener, event);
        }
    }
    assert!(open.is_empty());

    // AND the context is fully unwound
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn test_discriminator_is_first_child() {
    let template = person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);

    let view = generate_view(&template, &ada().into(), &mut ctx).unwrap();

    let begin = view
        .iter()
        .position(|e| *e == Event::begin_object(Some("pet")))
        .unwrap();
    assert_eq!(view[begin + 1].kind, EventKind::Discriminator);
    assert_eq!(view[begin + 1], Event::discriminator("@type", "Dog"));
}

#[test]
fn test_truncated_view_is_rejected() {
    // GIVEN a view missing its closing events
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let view = vec![
        Event::begin_object(None),
        Event::begin_object(Some("address")),
        Event::value(Some("city"), "Paris"),
    ];

    // WHEN staging
    let err = stage_view(&template, view, &mut ctx).unwrap_err();

    // THEN the failure is a malformed stream with a path
    assert!(matches!(err, ViewError::MalformedStream { .. }));
    assert_eq!(err.path(), Some("/address"));
}

#[test]
fn test_mismatched_end_is_rejected() {
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let view = vec![
        Event::begin_object(None),
        Event::begin_object(Some("address")),
        Event::end_object(Some("elsewhere")),
        Event::end_object(None),
    ];

    let err = stage_view(&template, view, &mut ctx).unwrap_err();

    assert_eq!(ExError::from(err).kind(), ExErrorKind::MalformedStream);
}

#[test]
fn test_malformed_view_leaves_target_untouched() {
    // GIVEN an existing person
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let target = ObjectRef::new(Bean::new("Person").with("name", "Ada"));

    // WHEN applying a view whose tail is broken
    let view = vec![
        Event::begin_object(None),
        Event::value(Some("name"), "Changed"),
        Event::end_array(None),
    ];
    let err = update_from_view(&template, view, &target, &mut ctx).unwrap_err();

    // THEN nothing was written
    assert!(matches!(err, ViewError::MalformedStream { .. }));
    assert_eq!(target.get("name"), ModelValue::from("Ada"));
}

#[test]
fn test_trailing_events_are_rejected() {
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let view = vec![
        Event::begin_object(None),
        Event::end_object(None),
        Event::begin_object(None),
        Event::end_object(None),
    ];

    let err = create_from_view(&template, view, &mut ctx).unwrap_err();

    assert!(matches!(err, ViewError::MalformedStream { .. }));
}

#[test]
fn test_view_starting_with_an_end_is_malformed() {
    // GIVEN a view whose first event closes nothing
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let view = vec![Event::end_object(None)];

    // WHEN staging it
    let err = stage_view(&template, view, &mut ctx).unwrap_err();

    // THEN it is a malformed stream at the first event
    assert!(matches!(err, ViewError::MalformedStream { .. }));
    assert_eq!(err.path(), Some("#0"));
}

#[test]
fn test_view_starting_with_a_discriminator_is_malformed() {
    // GIVEN a view whose first event is a discriminator outside any object
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let view = vec![
        Event::discriminator("@type", "Dog"),
        Event::begin_object(None),
        Event::end_object(None),
    ];

    // WHEN creating from it
    let err = create_from_view(&template, view, &mut ctx).unwrap_err();

    // THEN it is a malformed stream at the first event
    assert!(matches!(err, ViewError::MalformedStream { .. }));
    assert_eq!(err.path(), Some("#0"));
}
