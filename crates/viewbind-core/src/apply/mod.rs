//! View application: events to model
//!
//! Application runs in two phases. Staging walks the template against the
//! view and builds an [`Entity`] tree, failing before any model object has
//! been touched. Injection then writes that tree into a new or existing
//! model, reconciling associations and resolving references.

mod consume;
mod inject;
mod locator;

use crate::context::Context;
use crate::entity::Entity;
use crate::errors::{Result, ViewError};
use crate::event::{Event, EventKind};
use crate::model::ObjectRef;
use crate::node::Template;

use consume::ViewApplicator;
use inject::Injector;

/// Stage `events` against `template`
///
/// `Ok(None)` when the view is empty, the root is a null value, or a
/// listener vetoed the root.
///
/// # Errors
///
/// `MalformedStream` for broken nesting or trailing events,
/// `UnknownProperty` in strict mode, `TypeMismatch`, `Conversion`, and
/// discriminator failures. All carry the path of the failing element.
pub(crate) fn stage<'t>(
    template: &'t Template,
    events: Vec<Event>,
    ctx: &mut Context<'_>,
) -> Result<Option<Entity<'t>>> {
    let mut applicator = ViewApplicator::new(events, ctx);
    let Some(trigger) = applicator.cursor.next_event() else {
        tracing::debug!("empty view stages nothing");
        return Ok(None);
    };
    if trigger.kind.is_end() || trigger.kind == EventKind::Discriminator {
        return Err(ViewError::malformed(format!(
            "view cannot start with {}",
            trigger
        ))
        .at("#0"));
    }
    let entity = applicator.consume_root(template.root(), trigger)?;

    if let Some(extra) = applicator.cursor.peek() {
        return Err(ViewError::malformed(format!(
            "trailing {} after the root element",
            extra
        ))
        .at(&format!("#{}", applicator.cursor.consumed())));
    }
    Ok(entity)
}

/// Build a new root object from a staged entity
///
/// # Errors
///
/// Factory, accessor, converter, association, and resolver failures.
pub(crate) fn create(
    template: &Template,
    entity: &Entity<'_>,
    ctx: &mut Context<'_>,
) -> Result<ObjectRef> {
    Injector::new(ctx).create_root(template.root(), entity)
}

/// Write a staged entity into `target`
///
/// # Errors
///
/// `TypeMismatch` when `target` is not an instance of the staged type, plus
/// everything [`create`] can fail with.
pub(crate) fn update(
    template: &Template,
    entity: &Entity<'_>,
    target: &ObjectRef,
    ctx: &mut Context<'_>,
) -> Result<()> {
    Injector::new(ctx).update_root(template.root(), entity, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ViewConfig, ViewOptions};
    use crate::entity::Staged;
    use crate::event::ViewValue;
    use crate::model::{Bean, ModelValue, TypeRegistry};
    use crate::node::Node;

    fn template() -> Template {
        Template::new(
            Node::root("Person")
                .child(Node::value("name"))
                .child(Node::object("address", "Address").child(Node::value("city")))
                .child(
                    Node::object("pet", "Animal")
                        .discriminated()
                        .child(Node::value("name"))
                        .child(Node::subtype("Dog").child(Node::value("breed"))),
                ),
        )
        .unwrap()
    }

    fn config() -> ViewConfig {
        ViewConfig::new().with_types(TypeRegistry::new().with_subtype("Dog", "Animal"))
    }

    fn view() -> Vec<Event> {
        vec![
            Event::begin_object(None),
            Event::value(Some("name"), "Ada"),
            Event::begin_object(Some("pet")),
            Event::discriminator("@type", "Dog"),
            Event::value(Some("name"), "Rex"),
            Event::value(Some("breed"), "Beagle"),
            Event::end_object(Some("pet")),
            Event::end_object(None),
        ]
    }

    #[test]
    fn test_stage_resolves_discriminator_and_subtype_children() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);

        let entity = stage(&template, view(), &mut ctx).unwrap().unwrap();

        assert_eq!(entity.scalar("name"), Some(&ModelValue::from("Ada")));
        let pet = entity.get("pet").unwrap().value.as_entity().unwrap();
        assert_eq!(pet.type_name().map(|t| t.as_str()), Some("Dog"));
        assert_eq!(pet.scalar("breed"), Some(&ModelValue::from("Beagle")));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_stage_empty_view() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);
        assert!(stage(&template, Vec::new(), &mut ctx).unwrap().is_none());
    }

    #[test]
    fn test_trailing_events_are_malformed() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);
        let mut events = view();
        events.push(Event::value(Some("extra"), 1i64));

        let err = stage(&template, events, &mut ctx).unwrap_err();
        assert!(matches!(err, ViewError::MalformedStream { .. }));
    }

    #[test]
    fn test_unknown_property_strict_and_lenient() {
        let template = template();
        let mut events = view();
        events.insert(1, Event::value(Some("nickname"), "A"));

        let config = config();
        let mut ctx = Context::new(&config);
        match stage(&template, events.clone(), &mut ctx).unwrap_err() {
            ViewError::UnknownProperty {
                property, known, ..
            } => {
                assert_eq!(property, "nickname");
                assert!(known.contains(&"address".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let lenient = config.with_options(ViewOptions::lenient());
        let mut ctx = Context::new(&lenient);
        let entity = stage(&template, events, &mut ctx).unwrap().unwrap();
        assert!(!entity.contains("nickname"));
    }

    #[test]
    fn test_non_null_scalar_for_object_is_rejected() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);
        let events = vec![
            Event::begin_object(None),
            Event::value(Some("address"), "Main St"),
            Event::end_object(None),
        ];

        let err = stage(&template, events, &mut ctx).unwrap_err();
        assert!(matches!(err, ViewError::TypeMismatch { .. }));
        assert_eq!(err.path(), Some("/address"));
    }

    #[test]
    fn test_null_object_stages_null() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);
        let events = vec![
            Event::begin_object(None),
            Event::value(Some("address"), ViewValue::Null),
            Event::end_object(None),
        ];

        let entity = stage(&template, events, &mut ctx).unwrap().unwrap();
        assert!(matches!(
            entity.get("address").map(|p| &p.value),
            Some(Staged::Null)
        ));
    }

    #[test]
    fn test_create_and_update() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);
        let entity = stage(&template, view(), &mut ctx).unwrap().unwrap();

        let created = create(&template, &entity, &mut ctx).unwrap();
        assert_eq!(created.get("name"), ModelValue::from("Ada"));
        let pet = created.get("pet");
        let pet = pet.as_object().unwrap();
        assert_eq!(pet.type_name().as_str(), "Dog");
        assert_eq!(pet.get("breed"), ModelValue::from("Beagle"));

        let existing_pet = ObjectRef::new(Bean::new("Dog").with("name", "Old"));
        let target = ObjectRef::new(Bean::new("Person").with("pet", existing_pet.clone()));
        update(&template, &entity, &target, &mut ctx).unwrap();
        assert!(target.get("pet").as_object().unwrap().same_instance(&existing_pet));
        assert_eq!(existing_pet.get("name"), ModelValue::from("Rex"));
    }

    #[test]
    fn test_update_rejects_wrong_target_type() {
        let template = template();
        let config = config();
        let mut ctx = Context::new(&config);
        let entity = stage(&template, view(), &mut ctx).unwrap().unwrap();

        let target = ObjectRef::new(Bean::new("Invoice"));
        let err = update(&template, &entity, &target, &mut ctx).unwrap_err();
        assert!(matches!(err, ViewError::TypeMismatch { .. }));
    }
}
