#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Node-level and element-level vetoes, value substitution

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use viewbind_core::{
    create_from_view, generate_view, update_from_view, Bean, Context, ElementKey, Event,
    ModelValue, Node, ObjectRef, PathFilter, Template, ViewListener,
};

/// Vetoes one array position and counts how often each position is asked
struct SkipIndex {
    index: usize,
    asked: Arc<Vec<AtomicUsize>>,
}

impl ViewListener for SkipIndex {
    fn before_visit_element(
        &self,
        _node: &Node,
        key: ElementKey<'_>,
        _element: Option<&ModelValue>,
        _ctx: &Context<'_>,
    ) -> bool {
        if let ElementKey::Index(i) = key {
            if let Some(counter) = self.asked.get(i) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            return i != self.index;
        }
        true
    }
}

/// Upper-cases text on the way out, lower-cases on the way in
struct CaseFold;

impl ViewListener for CaseFold {
    fn on_extract_value(&self, _node: &Node, value: ModelValue, _ctx: &Context<'_>) -> ModelValue {
        match value {
            ModelValue::Text(s) => ModelValue::Text(s.to_uppercase()),
            other => other,
        }
    }

    fn on_inject_value(&self, _node: &Node, value: ModelValue, _ctx: &Context<'_>) -> ModelValue {
        match value {
            ModelValue::Text(s) => ModelValue::Text(s.to_lowercase()),
            other => other,
        }
    }
}

#[test]
fn test_node_veto_hides_value_both_ways() {
    // GIVEN a listener hiding /age
    let template = simple_person_template();
    let config = demo_config().with_listener(PathFilter::new().hide("/age"));
    let mut ctx = Context::new(&config);
    let source = ObjectRef::new(
        Bean::new("Person")
            .with("name", "Ada")
            .with("age", 36i64),
    );

    // WHEN generating
    let view = generate_view(&template, &source.into(), &mut ctx).unwrap();

    // THEN no age event is produced
    assert!(!view.iter().any(|e| e.name.as_deref() == Some("age")));

    // AND on application the age is treated as absent, not null
    let target = ObjectRef::new(Bean::new("Person").with("age", 99i64));
    let edited = vec![
        Event::begin_object(None),
        Event::value(Some("name"), "Grace"),
        Event::value(Some("age"), 1i64),
        Event::end_object(None),
    ];
    update_from_view(&template, edited, &target, &mut ctx).unwrap();
    assert_eq!(target.get("name"), ModelValue::from("Grace"));
    assert_eq!(target.get("age"), ModelValue::Int(99));
}

#[test]
fn test_veto_on_nested_object_skips_its_subtree() {
    let template = simple_person_template();
    let config = demo_config().with_listener(PathFilter::new().hide("/address"));
    let mut ctx = Context::new(&config);
    let view = vec![
        Event::begin_object(None),
        Event::begin_object(Some("address")),
        Event::value(Some("city"), "Paris"),
        Event::value(Some("not_declared"), 1i64),
        Event::end_object(Some("address")),
        Event::value(Some("name"), "Ada"),
        Event::end_object(None),
    ];

    let person = create_from_view(&template, view, &mut ctx).unwrap().unwrap();

    assert!(!person.has("address"));
    assert_eq!(person.get("name"), ModelValue::from("Ada"));
}

#[test]
fn test_element_veto_on_generation_and_application() {
    // GIVEN a template whose tags array vetoes position 1
    let asked = Arc::new((0..3).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>());
    let template = Template::new(
        Node::root("Person").child(Node::array_of_values("tags").with_listener(SkipIndex {
            index: 1,
            asked: Arc::clone(&asked),
        })),
    )
    .unwrap();
    let config = demo_config();
    let mut ctx = Context::new(&config);
    let source = ObjectRef::new(Bean::new("Person").with(
        "tags",
        vec![
            ModelValue::from("a"),
            ModelValue::from("b"),
            ModelValue::from("c"),
        ],
    ));

    // WHEN generating
    let view = generate_view(&template, &source.into(), &mut ctx).unwrap();

    // THEN only two element events are emitted
    let elements: Vec<_> = view.iter().filter(|e| e.name.is_none() && e.kind.is_scalar()).collect();
    assert_eq!(elements.len(), 2);
    assert_eq!(*elements[0], Event::value(None, "a"));
    assert_eq!(*elements[1], Event::value(None, "c"));

    // AND applying an edited two-element array consults positions 0 and 1 only
    for counter in asked.iter() {
        counter.store(0, Ordering::SeqCst);
    }
    let edited = vec![
        Event::begin_object(None),
        Event::begin_array(Some("tags")),
        Event::value(None, "x"),
        Event::value(None, "y"),
        Event::end_array(Some("tags")),
        Event::end_object(None),
    ];
    let person = create_from_view(&template, edited, &mut ctx).unwrap().unwrap();

    // AND the vetoed position never reaches the model
    assert_eq!(person.get("tags"), ModelValue::List(vec![ModelValue::from("x")]));
    assert_eq!(asked[0].load(Ordering::SeqCst), 1);
    assert_eq!(asked[1].load(Ordering::SeqCst), 1);
    assert_eq!(asked[2].load(Ordering::SeqCst), 0);
}

#[test]
fn test_value_substitution_in_both_directions() {
    let template = simple_person_template();
    let config = demo_config();
    let mut ctx = Context::new(&config).with_listener(CaseFold);
    let source = ObjectRef::new(Bean::new("Person").with("name", "Ada"));

    let view = generate_view(&template, &source.into(), &mut ctx).unwrap();
    assert!(view.contains(&Event::value(Some("name"), "ADA")));

    let copy = create_from_view(&template, view, &mut ctx).unwrap().unwrap();
    assert_eq!(copy.get("name"), ModelValue::from("ada"));
}

#[test]
fn test_first_veto_short_circuits_the_chain() {
    // GIVEN a hiding filter registered before a counting listener
    struct Count(Arc<AtomicUsize>);
    impl ViewListener for Count {
        fn should_visit_node(&self, _node: &Node, _ctx: &Context<'_>) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }
    let calls = Arc::new(AtomicUsize::new(0));
    let template = Template::new(Node::root("Person").child(Node::value("name"))).unwrap();
    let config = demo_config()
        .with_listener(PathFilter::new().hide("/name"))
        .with_listener(Count(Arc::clone(&calls)));
    let mut ctx = Context::new(&config);
    let source = ObjectRef::new(Bean::new("Person").with("name", "Ada"));

    // WHEN generating
    generate_view(&template, &source.into(), &mut ctx).unwrap();

    // THEN the counter saw the root but never the vetoed child
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
