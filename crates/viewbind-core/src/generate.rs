//! View generation: model to events

use crate::context::Context;
use crate::errors::{Result, ViewError};
use crate::event::{validate, Event, ViewValue};
use crate::listener::ElementKey;
use crate::model::ModelValue;
use crate::node::{Node, NodeVisitor, Template};

/// Walk `template` against `model` and produce the view
///
/// # Errors
///
/// Accessor, converter, discriminator, and splice failures abort generation
/// and carry the path of the node being generated.
pub(crate) fn generate(
    template: &Template,
    model: &ModelValue,
    ctx: &mut Context<'_>,
) -> Result<Vec<Event>> {
    let mut generator = ViewGenerator {
        ctx,
        out: Vec::new(),
    };
    template.root().accept(&mut generator, model)?;
    let events = generator.out;

    if generator.ctx.options().validate_generated_views {
        validate(&events)?;
    }
    Ok(events)
}

/// Visitor state: the output buffer plus the call's context
///
/// The visit state is the model that owns the visited node. Nodes with an
/// accessor read their own value from it; nodes without one (the root,
/// envelopes, subtypes) work on the owner itself.
struct ViewGenerator<'c, 'a> {
    ctx: &'c mut Context<'a>,
    out: Vec<Event>,
}

impl ViewGenerator<'_, '_> {
    /// Push the node's frame and consult the listener chain; a vetoed node
    /// is popped again and produces nothing
    fn enter(&mut self, node: &Node) -> bool {
        if !node.access().can_read() {
            return false;
        }
        self.ctx.push_node(node);
        if self.ctx.should_visit_node(node) {
            return true;
        }
        tracing::debug!(path = %self.ctx.path_string(), "node vetoed during generation");
        self.ctx.pop();
        false
    }

    /// Pop the frame, attaching the current path to a failure
    fn leave(&mut self, result: Result<()>) -> Result<()> {
        let result = result.map_err(|e| e.at(&self.ctx.path_string()));
        self.ctx.pop();
        result
    }

    fn extract(&self, node: &Node, owner: &ModelValue) -> Result<ModelValue> {
        match node.accessor() {
            Some(accessor) => accessor.get(owner),
            None => Ok(owner.clone()),
        }
    }

    fn null(&mut self, node: &Node, name: Option<&str>) {
        self.out
            .push(Event::value(name, ViewValue::Null).with_namespace(node.namespace()));
    }

    fn convert(&self, node: &Node, value: &ModelValue) -> Result<ViewValue> {
        self.ctx.converter_for(node).to_view_value(value)
    }

    /// `BeginObject`, optional discriminator, children, `EndObject`
    ///
    /// Shared by object and reference nodes and by the elements of object
    /// and reference collections.
    fn emit_object(&mut self, node: &Node, name: Option<&str>, value: &ModelValue) -> Result<()> {
        let object = match value {
            ModelValue::Null => {
                self.null(node, name);
                return Ok(());
            }
            ModelValue::Object(obj) => obj,
            other => {
                return Err(ViewError::type_mismatch(format!(
                    "expected an object for {}, found {}",
                    node.label(),
                    other.kind_name()
                )))
            }
        };

        self.out
            .push(Event::begin_object(name).with_namespace(node.namespace()));

        if node.attributes().discriminated {
            if let Some(base) = node.model_type() {
                let discriminator = self
                    .ctx
                    .discriminator_strategy_for(node)
                    .to_discriminator(base, &object.type_name())?;
                self.out.push(
                    Event::discriminator(&discriminator.name, &discriminator.value)
                        .with_namespace(node.namespace()),
                );
            }
        }

        self.ctx.enter_scope(value.clone());
        let children = self.emit_children(node, value);
        self.ctx.exit_scope();
        children?;

        self.out
            .push(Event::end_object(name).with_namespace(node.namespace()));
        Ok(())
    }

    fn emit_children(&mut self, node: &Node, owner: &ModelValue) -> Result<()> {
        for child in node.child_nodes() {
            child.accept(self, owner)?;
        }
        Ok(())
    }

    fn emit_scalar(&mut self, node: &Node, owner: &ModelValue, url: bool) -> Result<()> {
        let raw = self.extract(node, owner)?;
        let raw = self.ctx.on_extract_value(node, raw);
        let value = self.convert(node, &raw)?;
        let event = if url {
            Event::url(node.name(), value)
        } else {
            Event::value(node.name(), value)
        };
        self.out.push(event.with_namespace(node.namespace()));
        Ok(())
    }

    fn emit_array(&mut self, node: &Node, owner: &ModelValue, objects: bool) -> Result<()> {
        let items = match self.extract(node, owner)? {
            ModelValue::Null => {
                self.null(node, node.name());
                return Ok(());
            }
            ModelValue::List(items) => items,
            other => {
                return Err(ViewError::type_mismatch(format!(
                    "expected a list, found {}",
                    other.kind_name()
                )))
            }
        };

        self.out
            .push(Event::begin_array(node.name()).with_namespace(node.namespace()));
        for (index, item) in items.into_iter().enumerate() {
            let key = ElementKey::Index(index);
            self.emit_element(node, key, None, item, objects)?;
        }
        self.out
            .push(Event::end_array(node.name()).with_namespace(node.namespace()));
        Ok(())
    }

    fn emit_map(&mut self, node: &Node, owner: &ModelValue, objects: bool) -> Result<()> {
        let entries = match self.extract(node, owner)? {
            ModelValue::Null => {
                self.null(node, node.name());
                return Ok(());
            }
            ModelValue::Map(entries) => entries,
            other => {
                return Err(ViewError::type_mismatch(format!(
                    "expected a map, found {}",
                    other.kind_name()
                )))
            }
        };

        self.out
            .push(Event::begin_object(node.name()).with_namespace(node.namespace()));
        for (key, item) in entries {
            self.emit_element(node, ElementKey::Key(&key), Some(key.as_str()), item, objects)?;
        }
        self.out
            .push(Event::end_object(node.name()).with_namespace(node.namespace()));
        Ok(())
    }

    fn emit_element(
        &mut self,
        node: &Node,
        key: ElementKey<'_>,
        name: Option<&str>,
        item: ModelValue,
        objects: bool,
    ) -> Result<()> {
        if !self.ctx.before_visit_element(node, key, Some(&item)) {
            tracing::debug!(path = %self.ctx.path_string(), element = %key, "element vetoed");
            return Ok(());
        }
        let item = self.ctx.on_extract_element(node, key, item);

        self.ctx.push_element(key, node.model_type());
        let result = if objects {
            self.emit_object(node, name, &item)
        } else {
            self.convert(node, &item).map(|value| {
                self.out
                    .push(Event::value(name, value).with_namespace(node.namespace()));
            })
        };
        self.leave(result)
    }
}

impl<'n, 'm> NodeVisitor<'n, &'m ModelValue> for ViewGenerator<'_, '_> {
    type Output = Result<()>;

    fn visit_value(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self.emit_scalar(node, owner, false);
        self.leave(result)
    }

    fn visit_url(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self.emit_scalar(node, owner, true);
        self.leave(result)
    }

    fn visit_object(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self
            .extract(node, owner)
            .and_then(|value| self.emit_object(node, node.name(), &value));
        self.leave(result)
    }

    fn visit_reference(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        self.visit_object(node, owner)
    }

    fn visit_envelope(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        self.out
            .push(Event::begin_object(node.name()).with_namespace(node.namespace()));
        let result = self.emit_children(node, owner);
        if result.is_ok() {
            self.out
                .push(Event::end_object(node.name()).with_namespace(node.namespace()));
        }
        self.leave(result)
    }

    fn visit_subtype(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        let applies = node
            .model_type()
            .is_some_and(|ty| self.ctx.config().types.is_instance_of(owner, ty));
        if !applies {
            return Ok(());
        }
        // No frame of its own: subtype children are peers of the container's
        self.emit_children(node, owner)
    }

    fn visit_splice(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let start = self.out.len();
        let result = match &node.attributes().splice_handler {
            Some(handler) => handler.generate(node, owner, self.ctx, &mut self.out),
            None => Err(ViewError::configuration("splice node has no handler")),
        };
        let result = result.and_then(|()| {
            validate(&self.out[start..]).map_err(|e| {
                ViewError::splice(format!("handler produced a malformed sub-view: {}", e))
            })
        });
        self.leave(result)
    }

    fn visit_meta(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = match &node.attributes().meta_provider {
            Some(provider) => provider
                .compute(node, owner, self.ctx)
                .and_then(|value| self.convert(node, &value))
                .map(|value| {
                    self.out
                        .push(Event::value(node.name(), value).with_namespace(node.namespace()));
                }),
            None => Err(ViewError::configuration("meta node has no provider")),
        };
        self.leave(result)
    }

    fn visit_array_of_values(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self.emit_array(node, owner, false);
        self.leave(result)
    }

    fn visit_array_of_objects(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self.emit_array(node, owner, true);
        self.leave(result)
    }

    fn visit_array_of_references(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        self.visit_array_of_objects(node, owner)
    }

    fn visit_map_of_values(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self.emit_map(node, owner, false);
        self.leave(result)
    }

    fn visit_map_of_objects(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        if !self.enter(node) {
            return Ok(());
        }
        let result = self.emit_map(node, owner, true);
        self.leave(result)
    }

    fn visit_map_of_references(&mut self, node: &'n Node, owner: &'m ModelValue) -> Result<()> {
        self.visit_map_of_objects(node, owner)
    }
}
