//! Splice handlers: opaque, handler-owned sub-views

use indexmap::IndexMap;

use crate::context::Context;
use crate::converter::{ScalarConverter, ValueConverter};
use crate::errors::{Result, ViewError};
use crate::event::{Event, EventKind, ViewValue};
use crate::model::ModelValue;
use crate::node::Node;

/// Produces and consumes the sub-view of a splice node
///
/// The sub-view must be a single well-formed element (or nothing); the
/// engine validates what `generate` emits and captures exactly one element
/// for `apply`.
pub trait SpliceHandler: Send + Sync {
    /// Append the sub-view for `owner` to `out`
    ///
    /// # Errors
    ///
    /// Handler-specific failures; the engine attaches the path.
    fn generate(
        &self,
        node: &Node,
        owner: &ModelValue,
        ctx: &mut Context<'_>,
        out: &mut Vec<Event>,
    ) -> Result<()>;

    /// Apply a captured sub-view to `target`, the object owning the splice
    ///
    /// # Errors
    ///
    /// Handler-specific failures; the engine attaches the path.
    fn apply(
        &self,
        node: &Node,
        view: &[Event],
        target: &ModelValue,
        ctx: &mut Context<'_>,
    ) -> Result<()>;
}

/// Maps a free-form property (maps, lists, scalars) to events and back
///
/// Maps become objects whose entries are named by key, lists become arrays
/// of unnamed elements. Model objects are not supported; they belong in
/// template nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicSplice;

impl DynamicSplice {
    fn emit(name: Option<&str>, value: &ModelValue, out: &mut Vec<Event>) -> Result<()> {
        match value {
            ModelValue::Map(map) => {
                out.push(Event::begin_object(name));
                for (key, entry) in map {
                    Self::emit(Some(key.as_str()), entry, out)?;
                }
                out.push(Event::end_object(name));
            }
            ModelValue::List(items) => {
                out.push(Event::begin_array(name));
                for item in items {
                    Self::emit(None, item, out)?;
                }
                out.push(Event::end_array(name));
            }
            ModelValue::Object(obj) => {
                return Err(ViewError::splice(format!(
                    "object of type {} cannot be spliced dynamically",
                    obj.type_name()
                )));
            }
            scalar => out.push(Event::value(name, ScalarConverter.to_view_value(scalar)?)),
        }
        Ok(())
    }

    /// Read one element starting at `view[*pos]`, advancing `pos` past it
    fn read(view: &[Event], pos: &mut usize) -> Result<ModelValue> {
        let event = view
            .get(*pos)
            .ok_or_else(|| ViewError::splice("sub-view ended early"))?;
        *pos += 1;
        match event.kind {
            EventKind::Value | EventKind::Url => Ok(ScalarConverter.to_model_value(
                event.value.as_ref().unwrap_or(&ViewValue::Null),
                &Default::default(),
            )?),
            EventKind::BeginObject => {
                let mut map = IndexMap::new();
                while !Self::at_end(view, *pos, event) {
                    let key = view
                        .get(*pos)
                        .and_then(|e| e.name.clone())
                        .ok_or_else(|| ViewError::splice("unnamed entry inside object"))?;
                    map.insert(key, Self::read(view, pos)?);
                }
                *pos += 1;
                Ok(ModelValue::Map(map))
            }
            EventKind::BeginArray => {
                let mut items = Vec::new();
                while !Self::at_end(view, *pos, event) {
                    items.push(Self::read(view, pos)?);
                }
                *pos += 1;
                Ok(ModelValue::List(items))
            }
            _ => Err(ViewError::splice(format!("unexpected {}", event))),
        }
    }

    fn at_end(view: &[Event], pos: usize, opener: &Event) -> bool {
        view.get(pos).map_or(true, |e| opener.is_closed_by(e))
    }
}

impl SpliceHandler for DynamicSplice {
    fn generate(
        &self,
        node: &Node,
        owner: &ModelValue,
        _ctx: &mut Context<'_>,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let value = node.require_accessor()?.get(owner)?;
        Self::emit(node.name(), &value, out)
    }

    fn apply(
        &self,
        node: &Node,
        view: &[Event],
        target: &ModelValue,
        _ctx: &mut Context<'_>,
    ) -> Result<()> {
        let mut pos = 0;
        let value = Self::read(view, &mut pos)?;
        if pos != view.len() {
            return Err(ViewError::splice("trailing events after spliced element"));
        }
        node.require_accessor()?.set(target, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::event::validate;
    use crate::model::{Bean, ObjectRef};

    fn extras() -> ModelValue {
        let mut inner = IndexMap::new();
        inner.insert("color".to_string(), ModelValue::from("red"));
        inner.insert("sizes".to_string(), ModelValue::List(vec![1i64.into(), 2i64.into()]));
        ModelValue::Map(inner)
    }

    #[test]
    fn test_dynamic_splice_round_trip() {
        let config = ViewConfig::new();
        let mut ctx = Context::new(&config);
        let node = Node::splice("extra", DynamicSplice);
        let source = ModelValue::Object(ObjectRef::new(Bean::new("Item").with("extra", extras())));

        let mut out = Vec::new();
        DynamicSplice.generate(&node, &source, &mut ctx, &mut out).unwrap();
        assert!(validate(&out).is_ok());
        assert_eq!(out.first(), Some(&Event::begin_object(Some("extra"))));

        let target = ModelValue::Object(ObjectRef::new(Bean::new("Item")));
        DynamicSplice.apply(&node, &out, &target, &mut ctx).unwrap();
        assert_eq!(target.as_object().unwrap().get("extra"), extras());
    }

    #[test]
    fn test_dynamic_splice_rejects_objects() {
        let config = ViewConfig::new();
        let mut ctx = Context::new(&config);
        let node = Node::splice("extra", DynamicSplice);
        let nested = ModelValue::Object(ObjectRef::new(Bean::new("Other")));
        let source = ModelValue::Object(ObjectRef::new(Bean::new("Item").with("extra", nested)));

        let err = DynamicSplice
            .generate(&node, &source, &mut ctx, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ViewError::Splice { .. }));
    }
}
