//! Injection: staged entities into the model
//!
//! Runs only after the whole view has been staged, so a malformed or
//! rejected view never leaves the target half-written by this engine.

use crate::association::{AssociationManager, ElementSync};
use crate::context::Context;
use crate::entity::{Entity, Staged};
use crate::errors::{Result, ViewError};
use crate::model::{ModelValue, ObjectRef, TypeName};
use crate::node::{Node, NodeKind};
use crate::reference::ReferenceRequest;

pub(crate) struct Injector<'c, 'a> {
    ctx: &'c mut Context<'a>,
}

impl<'c, 'a> Injector<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut Context<'a>) -> Self {
        Self { ctx }
    }

    /// Construct a fresh root object for `entity` and fill it
    pub(crate) fn create_root(&mut self, root: &Node, entity: &Entity<'_>) -> Result<ObjectRef> {
        self.ctx.push_node(root);
        let result = self
            .instantiate(root, entity)
            .and_then(|obj| self.inject_entity(entity, &obj).map(|()| obj));
        self.leave(result)
    }

    /// Fill an existing root object from `entity`
    pub(crate) fn update_root(
        &mut self,
        root: &Node,
        entity: &Entity<'_>,
        target: &ObjectRef,
    ) -> Result<()> {
        self.ctx.push_node(root);
        let result = self.check_target(entity, target).and_then(|()| self.inject_entity(entity, target));
        self.leave(result)
    }

    fn check_target(&self, entity: &Entity<'_>, target: &ObjectRef) -> Result<()> {
        let Some(expected) = entity.type_name() else {
            return Ok(());
        };
        let actual = target.type_name();
        if self.ctx.config().types.is_assignable(&actual, expected) {
            Ok(())
        } else {
            Err(ViewError::type_mismatch(format!(
                "target of type {} is not a {}",
                actual, expected
            )))
        }
    }

    fn leave<T>(&mut self, result: Result<T>) -> Result<T> {
        let result = result.map_err(|e| e.at(&self.ctx.path_string()));
        self.ctx.pop();
        result
    }

    fn inject_entity(&mut self, entity: &Entity<'_>, target: &ObjectRef) -> Result<()> {
        let owner = ModelValue::Object(target.clone());
        self.ctx.enter_scope(owner.clone());
        let result = self.inject_properties(entity, &owner);
        self.ctx.exit_scope();
        result
    }

    fn inject_properties(&mut self, entity: &Entity<'_>, owner: &ModelValue) -> Result<()> {
        for (_, property) in entity.iter() {
            self.ctx.push_node(property.node);
            let result = self.inject_property(property.node, &property.value, owner);
            self.leave(result)?;
        }
        Ok(())
    }

    fn inject_property<'t>(
        &mut self,
        node: &'t Node,
        staged: &Staged<'t>,
        owner: &ModelValue,
    ) -> Result<()> {
        if !node.access().can_write() {
            tracing::trace!(path = %self.ctx.path_string(), "skipping read-only node");
            return Ok(());
        }
        match node.kind() {
            NodeKind::Value | NodeKind::Url => {
                let value = match staged {
                    Staged::Scalar(value) => value.clone(),
                    Staged::Null => ModelValue::Null,
                    other => return Err(unexpected(node, other)),
                };
                let value = self.ctx.on_inject_value(node, value);
                node.require_accessor()?.set(owner, value)
            }
            NodeKind::Meta => Ok(()),
            NodeKind::Envelope => match staged {
                Staged::Entity(entity) => self.inject_properties(entity, owner),
                Staged::Null => Ok(()),
                other => Err(unexpected(node, other)),
            },
            NodeKind::Object | NodeKind::Reference => {
                let manager = self.manager_for(node);
                manager.reconcile_one(staged, &mut self.sync(node, owner))
            }
            NodeKind::ArrayOfValues | NodeKind::ArrayOfObjects | NodeKind::ArrayOfReferences => {
                match staged {
                    Staged::List(items) => {
                        let manager = self.manager_for(node);
                        manager.reconcile_list(items, &mut self.sync(node, owner))
                    }
                    Staged::Null => node.require_accessor()?.set(owner, ModelValue::Null),
                    other => Err(unexpected(node, other)),
                }
            }
            NodeKind::MapOfValues | NodeKind::MapOfObjects | NodeKind::MapOfReferences => {
                match staged {
                    Staged::Map(entries) => {
                        let manager = self.manager_for(node);
                        manager.reconcile_map(entries, &mut self.sync(node, owner))
                    }
                    Staged::Null => node.require_accessor()?.set(owner, ModelValue::Null),
                    other => Err(unexpected(node, other)),
                }
            }
            NodeKind::Splice => match (staged, &node.attributes().splice_handler) {
                (Staged::View(view), Some(handler)) => handler.apply(node, view, owner, self.ctx),
                (_, None) => Err(ViewError::configuration("splice node has no handler")),
                (other, _) => Err(unexpected(node, other)),
            },
            NodeKind::Subtype => Err(ViewError::Internal {
                message: format!("subtype {} staged as a property", node.label()),
            }),
        }
    }

    fn manager_for<'n>(&self, node: &'n Node) -> &'n dyn AssociationManager
    where
        'a: 'n,
    {
        match &node.attributes().association_manager {
            Some(manager) => manager.as_ref(),
            None => self.ctx.config().association_manager(),
        }
    }

    fn sync<'i, 'n>(
        &'i mut self,
        node: &'n Node,
        owner: &'i ModelValue,
    ) -> PropertySync<'i, 'c, 'a, 'n> {
        PropertySync {
            injector: self,
            node,
            owner,
        }
    }

    fn instantiate(&self, node: &Node, entity: &Entity<'_>) -> Result<ObjectRef> {
        let ty = target_type(node, entity)?;
        let config = self.ctx.config();
        let obj = config.factory().create(&ty, &config.types)?;
        tracing::trace!(path = %self.ctx.path_string(), type_name = %ty, "object created");
        Ok(obj)
    }

    /// Turn a staged element into the model value to store
    fn materialize(&mut self, node: &Node, staged: &Staged<'_>) -> Result<ModelValue> {
        match staged {
            Staged::Null => Ok(ModelValue::Null),
            Staged::Scalar(value) => Ok(self.ctx.on_inject_value(node, value.clone())),
            Staged::Entity(entity) if node.kind().is_reference() => self.resolve(node, entity),
            Staged::Entity(entity) => {
                let obj = self.instantiate(node, entity)?;
                self.inject_entity(entity, &obj)?;
                Ok(ModelValue::Object(obj))
            }
            other => Err(unexpected(node, other)),
        }
    }

    /// Apply `staged` onto `existing` in place when the types line up
    fn refresh(
        &mut self,
        node: &Node,
        existing: &ModelValue,
        staged: &Staged<'_>,
    ) -> Result<ModelValue> {
        if node.kind().is_reference() {
            return self.materialize(node, staged);
        }
        if let (Some(obj), Staged::Entity(entity)) = (existing.as_object(), staged) {
            let fits = entity
                .type_name()
                .map_or(true, |ty| self.ctx.config().types.is_instance_of(existing, ty));
            if fits {
                self.inject_entity(entity, obj)?;
                return Ok(existing.clone());
            }
        }
        self.materialize(node, staged)
    }

    fn resolve(&mut self, node: &Node, entity: &Entity<'_>) -> Result<ModelValue> {
        let resolver = self
            .ctx
            .resolver()
            .ok_or_else(|| ViewError::configuration("reference node requires a resolver"))?;
        let request = ReferenceRequest {
            node_path: self.ctx.path_string(),
            type_name: target_type(node, entity)?,
            keys: entity.scalars(),
        };
        match resolver.resolve(&request, self.ctx)? {
            Some(found) => {
                tracing::trace!(
                    path = %request.node_path,
                    type_name = %request.type_name,
                    keys = %request.describe_keys(),
                    "reference resolved"
                );
                Ok(found)
            }
            None if node.attributes().tolerate_unresolved
                || self.ctx.options().tolerate_unresolved_references =>
            {
                tracing::debug!(
                    path = %request.node_path,
                    type_name = %request.type_name,
                    keys = %request.describe_keys(),
                    "unresolved reference left null"
                );
                Ok(ModelValue::Null)
            }
            None => Err(ViewError::UnresolvedReference {
                path: String::new(),
                type_name: request.type_name.to_string(),
                keys: request.describe_keys(),
            }),
        }
    }
}

fn target_type(node: &Node, entity: &Entity<'_>) -> Result<TypeName> {
    entity
        .type_name()
        .or(node.model_type())
        .cloned()
        .ok_or_else(|| {
            ViewError::configuration(format!("no model type to construct for {}", node.label()))
        })
}

fn unexpected(node: &Node, staged: &Staged<'_>) -> ViewError {
    ViewError::Internal {
        message: format!("{} staged for {:?} node {}", staged.kind_name(), node.kind(), node.label()),
    }
}

/// [`ElementSync`] over one property of one owner object
struct PropertySync<'i, 'c, 'a, 'n> {
    injector: &'i mut Injector<'c, 'a>,
    node: &'n Node,
    owner: &'i ModelValue,
}

impl<'t> ElementSync<'t> for PropertySync<'_, '_, '_, '_> {
    fn current(&self) -> Result<ModelValue> {
        self.node.require_accessor()?.get(self.owner)
    }

    fn set(&mut self, value: ModelValue) -> Result<()> {
        self.node.require_accessor()?.set(self.owner, value)
    }

    fn add(&mut self, element: ModelValue) -> Result<()> {
        self.node.require_accessor()?.add(self.owner, element)
    }

    fn remove(&mut self, element: &ModelValue) -> Result<bool> {
        self.node.require_accessor()?.remove(self.owner, element)
    }

    fn clear(&mut self) -> Result<()> {
        self.node.require_accessor()?.clear(self.owner)
    }

    fn put(&mut self, key: &str, element: ModelValue) -> Result<()> {
        self.node.require_accessor()?.put(self.owner, key, element)
    }

    fn remove_key(&mut self, key: &str) -> Result<bool> {
        self.node.require_accessor()?.remove_key(self.owner, key)
    }

    fn create(&mut self, staged: &Staged<'t>) -> Result<ModelValue> {
        self.injector.materialize(self.node, staged)
    }

    fn update(&mut self, existing: &ModelValue, staged: &Staged<'t>) -> Result<ModelValue> {
        self.injector.refresh(self.node, existing, staged)
    }
}
