//! Public generate/apply operations with boundary logging
//!
//! ## Logging Ownership
//!
//! These functions own lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Traversal code underneath uses only `tracing::debug!()`/`trace!()`.

use std::time::Instant;

use crate::apply;
use crate::context::Context;
use crate::entity::Entity;
use crate::errors::Result;
use crate::event::Event;
use crate::generate;
use crate::model::{ModelValue, ObjectRef};
use crate::node::Template;
use crate::{log_op_end, log_op_error, log_op_start};

fn root_type(template: &Template) -> String {
    template
        .root()
        .model_type()
        .map_or_else(|| template.root().label(), |ty| ty.to_string())
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Render `model` through `template` into a view
///
/// ## Errors
///
/// - `Accessor`: a property could not be read
/// - `Conversion`: a value has no view representation
/// - `TypeMismatch`: the model shape disagrees with the template
/// - `Splice`: a splice handler failed or produced a malformed sub-view
/// - `MalformedStream`: the generated view failed validation
pub fn generate_view(
    template: &Template,
    model: &ModelValue,
    ctx: &mut Context<'_>,
) -> Result<Vec<Event>> {
    let request_id = ctx.request().request_id.clone();
    log_op_start!(
        "generate_view",
        root_type = %root_type(template),
        request_id = %request_id
    );
    let start = Instant::now();

    let events = generate::generate(template, model, ctx).map_err(|e| {
        log_op_error!(
            "generate_view",
            e.clone(),
            duration_ms = elapsed_ms(start),
            request_id = %request_id
        );
        e
    })?;

    log_op_end!(
        "generate_view",
        duration_ms = elapsed_ms(start),
        root_type = %root_type(template),
        event_count = events.len(),
        request_id = %request_id
    );
    Ok(events)
}

/// Parse `events` into a staged entity without touching any model
///
/// Returns `None` for an empty view, a null root, or a vetoed root.
///
/// ## Errors
///
/// - `MalformedStream`: broken nesting, truncation, or trailing events
/// - `UnknownProperty`: unmatched property in strict mode
/// - `TypeMismatch`: scalar where a structure was expected, or the reverse
/// - `Conversion`: a value converter rejected a value
pub fn stage_view<'t>(
    template: &'t Template,
    events: Vec<Event>,
    ctx: &mut Context<'_>,
) -> Result<Option<Entity<'t>>> {
    let request_id = ctx.request().request_id.clone();
    log_op_start!(
        "stage_view",
        root_type = %root_type(template),
        event_count = events.len(),
        request_id = %request_id
    );
    let start = Instant::now();

    let staged = apply::stage(template, events, ctx).map_err(|e| {
        log_op_error!(
            "stage_view",
            e.clone(),
            duration_ms = elapsed_ms(start),
            request_id = %request_id
        );
        e
    })?;

    log_op_end!(
        "stage_view",
        duration_ms = elapsed_ms(start),
        root_type = %root_type(template),
        staged = staged.is_some(),
        request_id = %request_id
    );
    Ok(staged)
}

/// Build a new model object from a view
///
/// Returns `None` when the view stages nothing (see [`stage_view`]).
/// Staging completes before any object is constructed; a failure during
/// injection may leave the partially built object unreachable but never
/// touches existing objects other than through reference resolution.
///
/// ## Errors
///
/// Everything [`stage_view`] reports, plus:
/// - `Configuration`: no type to construct, abstract type, missing resolver
/// - `UnresolvedReference`: a reference has no target and is not tolerated
/// - `Accessor`: a property could not be written
pub fn create_from_view(
    template: &Template,
    events: Vec<Event>,
    ctx: &mut Context<'_>,
) -> Result<Option<ObjectRef>> {
    let request_id = ctx.request().request_id.clone();
    log_op_start!(
        "create_from_view",
        root_type = %root_type(template),
        event_count = events.len(),
        request_id = %request_id
    );
    let start = Instant::now();

    let result = apply::stage(template, events, ctx).and_then(|staged| match staged {
        Some(entity) => apply::create(template, &entity, ctx).map(Some),
        None => Ok(None),
    });
    let created = result.map_err(|e| {
        log_op_error!(
            "create_from_view",
            e.clone(),
            duration_ms = elapsed_ms(start),
            request_id = %request_id
        );
        e
    })?;

    log_op_end!(
        "create_from_view",
        duration_ms = elapsed_ms(start),
        root_type = %root_type(template),
        created = created.is_some(),
        request_id = %request_id
    );
    Ok(created)
}

/// Apply a view onto an existing model object
///
/// Only properties present in the view are written. If staging fails the
/// target is untouched. Injection is not transactional: a failure while
/// writing leaves earlier writes in place.
///
/// ## Errors
///
/// Everything [`create_from_view`] reports, plus `TypeMismatch` when
/// `target` is not an instance of the staged type.
pub fn update_from_view(
    template: &Template,
    events: Vec<Event>,
    target: &ObjectRef,
    ctx: &mut Context<'_>,
) -> Result<()> {
    let request_id = ctx.request().request_id.clone();
    log_op_start!(
        "update_from_view",
        root_type = %root_type(template),
        target_type = %target.type_name(),
        event_count = events.len(),
        request_id = %request_id
    );
    let start = Instant::now();

    let result = apply::stage(template, events, ctx).and_then(|staged| match staged {
        Some(entity) => apply::update(template, &entity, target, ctx),
        None => {
            tracing::debug!("view staged nothing; target left unchanged");
            Ok(())
        }
    });
    result.map_err(|e| {
        log_op_error!(
            "update_from_view",
            e.clone(),
            duration_ms = elapsed_ms(start),
            request_id = %request_id
        );
        e
    })?;

    log_op_end!(
        "update_from_view",
        duration_ms = elapsed_ms(start),
        root_type = %root_type(template),
        request_id = %request_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::model::Bean;
    use crate::node::Node;

    fn template() -> Template {
        Template::new(
            Node::root("Person")
                .child(Node::value("name"))
                .child(Node::value("age")),
        )
        .unwrap()
    }

    #[test]
    fn test_generate_then_create() {
        let template = template();
        let config = ViewConfig::new();
        let mut ctx = Context::new(&config);
        let ada = ObjectRef::new(Bean::new("Person").with("name", "Ada").with("age", 36i64));

        let view = generate_view(&template, &ada.into(), &mut ctx).unwrap();
        let copy = create_from_view(&template, view, &mut ctx).unwrap().unwrap();

        assert_eq!(copy.get("name"), ModelValue::from("Ada"));
        assert_eq!(copy.get("age"), ModelValue::Int(36));
    }

    #[test]
    fn test_update_leaves_absent_properties_alone() {
        let template = template();
        let config = ViewConfig::new();
        let mut ctx = Context::new(&config);
        let target = ObjectRef::new(Bean::new("Person").with("name", "Ada").with("age", 36i64));
        let view = vec![
            Event::begin_object(None),
            Event::value(Some("age"), 37i64),
            Event::end_object(None),
        ];

        update_from_view(&template, view, &target, &mut ctx).unwrap();

        assert_eq!(target.get("name"), ModelValue::from("Ada"));
        assert_eq!(target.get("age"), ModelValue::Int(37));
    }

    #[test]
    fn test_empty_view_creates_nothing() {
        let template = template();
        let config = ViewConfig::new();
        let mut ctx = Context::new(&config);
        assert!(create_from_view(&template, Vec::new(), &mut ctx)
            .unwrap()
            .is_none());
    }
}
