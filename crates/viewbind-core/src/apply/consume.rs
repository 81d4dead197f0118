//! Staging: events to entities
//!
//! The template is walked in lockstep with the incoming view. Each visit
//! receives the event that triggered it (already removed from the cursor)
//! and consumes the rest of that element's subtree.

use indexmap::IndexMap;

use super::locator::{known_names, locate};
use crate::context::Context;
use crate::discriminator::Discriminator;
use crate::entity::{Entity, Staged};
use crate::errors::{Result, ViewError};
use crate::event::{Event, EventCursor, EventKind, ViewValue};
use crate::listener::ElementKey;
use crate::model::ModelValue;
use crate::node::{Node, NodeVisitor};

/// `Ok(None)` means the element was consumed but stages nothing
type Consumed<'t> = Result<Option<Staged<'t>>>;

pub(crate) struct ViewApplicator<'c, 'a> {
    pub(crate) cursor: EventCursor,
    ctx: &'c mut Context<'a>,
}

impl<'c, 'a> ViewApplicator<'c, 'a> {
    pub(crate) fn new(events: Vec<Event>, ctx: &'c mut Context<'a>) -> Self {
        Self {
            cursor: EventCursor::new(events),
            ctx,
        }
    }

    /// Stage the root element opened by `trigger`
    ///
    /// A vetoed root, or a root given as a null value, stages nothing.
    pub(crate) fn consume_root<'t>(
        &mut self,
        root: &'t Node,
        trigger: Event,
    ) -> Result<Option<Entity<'t>>> {
        self.ctx.push_node(root);
        if !self.ctx.should_visit_node(root) {
            let skipped = self.cursor.skip_subtree(&trigger);
            tracing::debug!("root vetoed during application");
            return self.leave(skipped.map(|_| None));
        }
        let staged = root.accept(self, trigger);
        let staged = self.leave(staged)?;
        match staged {
            Some(Staged::Entity(entity)) => Ok(Some(entity)),
            None | Some(Staged::Null) => Ok(None),
            Some(other) => Err(ViewError::Internal {
                message: format!("root staged as {}", other.kind_name()),
            }),
        }
    }

    fn leave<T>(&mut self, result: Result<T>) -> Result<T> {
        let result = result.map_err(|e| e.at(&self.ctx.path_string()));
        self.ctx.pop();
        result
    }

    fn convert(&self, node: &Node, event: &Event) -> Result<ModelValue> {
        let value = event.value.as_ref().unwrap_or(&ViewValue::Null);
        self.ctx
            .converter_for(node)
            .to_model_value(value, &node.data_type())
    }

    /// Consume the body of an object whose `BeginObject` was `trigger`
    fn consume_object<'t>(&mut self, node: &'t Node, trigger: &Event) -> Result<Entity<'t>> {
        let mut entity = Entity::new(node.model_type().cloned());
        let types = &self.ctx.config().types;

        if self
            .cursor
            .peek()
            .is_some_and(|e| e.kind == EventKind::Discriminator)
        {
            let event = self.cursor.require_next("discriminator")?;
            self.consume_discriminator(node, event, &mut entity)?;
        }

        loop {
            let event = self
                .cursor
                .require_next(&format!("end of {}", trigger.label()))?;
            if trigger.is_closed_by(&event) {
                break;
            }
            if event.kind.is_end() {
                return Err(ViewError::malformed(format!(
                    "{} does not close {}",
                    event, trigger
                )));
            }
            if event.kind == EventKind::Discriminator {
                return Err(ViewError::malformed(format!(
                    "{} must be the first child of its object",
                    event
                )));
            }
            let Some(name) = event.name.clone() else {
                return Err(ViewError::malformed(format!(
                    "unnamed {} inside {}",
                    event, trigger
                )));
            };

            let Some(child) = locate(
                node,
                entity.type_name(),
                &name,
                event.namespace.as_deref(),
                types,
            ) else {
                self.unknown_property(node, &entity, &name, &event)?;
                continue;
            };

            self.ctx.push_node(child);
            if !self.ctx.should_visit_node(child) {
                let skipped = self.cursor.skip_subtree(&event);
                tracing::debug!(path = %self.ctx.path_string(), "node vetoed during application");
                self.leave(skipped)?;
                continue;
            }
            let staged = child.accept(self, event);
            if let Some(value) = self.leave(staged)? {
                entity.insert(name, child, value);
            }
        }
        Ok(entity)
    }

    /// Skip an unmatched property in lenient mode, reject it otherwise
    fn unknown_property(
        &mut self,
        node: &Node,
        entity: &Entity<'_>,
        name: &str,
        event: &Event,
    ) -> Result<()> {
        if self.ctx.options().ignore_unknown_properties {
            let skipped = self.cursor.skip_subtree(event)?;
            tracing::debug!(
                container = %node.label(),
                property = %name,
                skipped_events = skipped,
                "ignoring unknown property"
            );
            return Ok(());
        }
        Err(ViewError::UnknownProperty {
            path: String::new(),
            container: node.label(),
            property: name.to_string(),
            known: known_names(node, entity.type_name(), &self.ctx.config().types),
        })
    }

    fn consume_discriminator(
        &mut self,
        node: &Node,
        event: Event,
        entity: &mut Entity<'_>,
    ) -> Result<()> {
        let name = event.label().to_string();
        let base = match node.model_type() {
            Some(base) if node.attributes().discriminated => base,
            _ => return self.unknown_property(node, entity, &name, &event),
        };
        let value = match &event.value {
            Some(ViewValue::Text(value)) => value.clone(),
            other => {
                return Err(ViewError::type_mismatch(format!(
                    "discriminator {} must be text, found {:?}",
                    name, other
                )))
            }
        };
        let concrete = self.ctx.discriminator_strategy_for(node).to_subtype(
            base,
            &Discriminator::new(name, value),
            &self.ctx.config().types,
        )?;
        tracing::trace!(base = %base, concrete = %concrete, "discriminator resolved");
        entity.set_type_name(concrete);
        Ok(())
    }

    /// An object-shaped element: a full object or an explicit null
    fn consume_object_element<'t>(&mut self, node: &'t Node, event: Event) -> Result<Staged<'t>> {
        match event.kind {
            EventKind::BeginObject => Ok(Staged::Entity(self.consume_object(node, &event)?)),
            EventKind::Value if event.is_null_value() => Ok(Staged::Null),
            EventKind::Value | EventKind::Url => Err(ViewError::type_mismatch(
                "scalar value for object node must be null",
            )),
            _ => Err(ViewError::type_mismatch(format!(
                "expected an object for {}, found {}",
                node.label(),
                event
            ))),
        }
    }

    fn consume_value_element<'t>(&mut self, node: &Node, event: Event) -> Result<Staged<'t>> {
        match event.kind {
            EventKind::Value | EventKind::Url => Ok(Staged::Scalar(self.convert(node, &event)?)),
            _ => Err(ViewError::type_mismatch(format!(
                "expected a scalar for {}, found {}",
                node.label(),
                event
            ))),
        }
    }

    /// Arrays stage a list of elements, maps a keyed collection
    fn consume_collection<'t>(
        &mut self,
        node: &'t Node,
        trigger: Event,
        keyed: bool,
        objects: bool,
    ) -> Consumed<'t> {
        if trigger.is_null_value() {
            return Ok(Some(Staged::Null));
        }
        let opener = if keyed {
            EventKind::BeginObject
        } else {
            EventKind::BeginArray
        };
        if trigger.kind != opener {
            return Err(ViewError::type_mismatch(format!(
                "expected {} for {}, found {}",
                if keyed { "a map" } else { "an array" },
                node.label(),
                trigger
            )));
        }

        let mut list = Vec::new();
        let mut map = IndexMap::new();
        let mut index = 0;
        loop {
            let event = self
                .cursor
                .require_next(&format!("end of {}", trigger.label()))?;
            if trigger.is_closed_by(&event) {
                break;
            }
            if event.kind.is_end() || event.kind == EventKind::Discriminator {
                return Err(ViewError::malformed(format!(
                    "unexpected {} inside {}",
                    event, trigger
                )));
            }
            let entry = if keyed {
                let key = event
                    .name
                    .clone()
                    .ok_or_else(|| ViewError::malformed("map entry without a key"))?;
                Some(key)
            } else {
                None
            };
            let key = match &entry {
                Some(k) => ElementKey::Key(k),
                None => ElementKey::Index(index),
            };
            index += 1;

            if !self.ctx.before_visit_element(node, key, None) {
                self.cursor.skip_subtree(&event)?;
                tracing::debug!(path = %self.ctx.path_string(), element = %key, "element vetoed");
                continue;
            }
            self.ctx.push_element(key, node.model_type());
            let staged = if objects {
                self.consume_object_element(node, event)
            } else {
                self.consume_value_element(node, event)
            };
            let staged = self.leave(staged)?;
            match entry {
                Some(k) => {
                    map.insert(k, staged);
                }
                None => list.push(staged),
            }
        }

        Ok(Some(if keyed {
            Staged::Map(map)
        } else {
            Staged::List(list)
        }))
    }
}

impl<'t> NodeVisitor<'t, Event> for ViewApplicator<'_, '_> {
    type Output = Consumed<'t>;

    fn visit_value(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_value_element(node, trigger).map(Some)
    }

    fn visit_url(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_value_element(node, trigger).map(Some)
    }

    fn visit_object(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_object_element(node, trigger).map(Some)
    }

    fn visit_reference(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_object_element(node, trigger).map(Some)
    }

    fn visit_envelope(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        // Envelope children write to the enclosing object
        self.consume_object_element(node, trigger).map(Some)
    }

    fn visit_subtype(&mut self, node: &'t Node, _trigger: Event) -> Consumed<'t> {
        Err(ViewError::Internal {
            message: format!("subtype {} visited outside its container", node.label()),
        })
    }

    fn visit_splice(&mut self, _node: &'t Node, trigger: Event) -> Consumed<'t> {
        let view = self.cursor.take_subtree(trigger)?;
        Ok(Some(Staged::View(view)))
    }

    fn visit_meta(&mut self, _node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.cursor.skip_subtree(&trigger)?;
        Ok(None)
    }

    fn visit_array_of_values(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_collection(node, trigger, false, false)
    }

    fn visit_array_of_objects(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_collection(node, trigger, false, true)
    }

    fn visit_array_of_references(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_collection(node, trigger, false, true)
    }

    fn visit_map_of_values(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_collection(node, trigger, true, false)
    }

    fn visit_map_of_objects(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_collection(node, trigger, true, true)
    }

    fn visit_map_of_references(&mut self, node: &'t Node, trigger: Event) -> Consumed<'t> {
        self.consume_collection(node, trigger, true, true)
    }
}
