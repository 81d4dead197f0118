//! Association reconciliation
//!
//! When a view updates a to-one or to-many property, the staged elements are
//! reconciled against what the target model already holds. Managers decide
//! which existing elements to keep, update, or drop; [`ElementSync`] performs
//! the actual reads, writes, and object construction on their behalf.

use indexmap::IndexMap;

use crate::entity::Staged;
use crate::errors::Result;
use crate::model::ModelValue;

/// Mutation surface of one association property
///
/// `create` builds a fresh model value from a staged element (for reference
/// nodes: resolves it). `update` applies a staged element onto an existing
/// value, returning the value to keep, which is `existing` itself whenever
/// it can be updated in place.
pub trait ElementSync<'t> {
    /// # Errors
    ///
    /// Accessor failures.
    fn current(&self) -> Result<ModelValue>;

    /// # Errors
    ///
    /// Accessor failures.
    fn set(&mut self, value: ModelValue) -> Result<()>;

    /// # Errors
    ///
    /// Accessor failures.
    fn add(&mut self, element: ModelValue) -> Result<()>;

    /// # Errors
    ///
    /// Accessor failures.
    fn remove(&mut self, element: &ModelValue) -> Result<bool>;

    /// # Errors
    ///
    /// Accessor failures.
    fn clear(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Accessor failures.
    fn put(&mut self, key: &str, element: ModelValue) -> Result<()>;

    /// # Errors
    ///
    /// Accessor failures.
    fn remove_key(&mut self, key: &str) -> Result<bool>;

    /// # Errors
    ///
    /// Construction, injection, or resolution failures.
    fn create(&mut self, staged: &Staged<'t>) -> Result<ModelValue>;

    /// # Errors
    ///
    /// Injection or resolution failures.
    fn update(&mut self, existing: &ModelValue, staged: &Staged<'t>) -> Result<ModelValue>;
}

/// Reconciliation strategy for one association
pub trait AssociationManager: Send + Sync {
    /// # Errors
    ///
    /// Propagates [`ElementSync`] failures.
    fn reconcile_one<'t>(&self, staged: &Staged<'t>, sync: &mut dyn ElementSync<'t>) -> Result<()>;

    /// # Errors
    ///
    /// Propagates [`ElementSync`] failures.
    fn reconcile_list<'t>(
        &self,
        staged: &[Staged<'t>],
        sync: &mut dyn ElementSync<'t>,
    ) -> Result<()>;

    /// # Errors
    ///
    /// Propagates [`ElementSync`] failures.
    fn reconcile_map<'t>(
        &self,
        staged: &IndexMap<String, Staged<'t>>,
        sync: &mut dyn ElementSync<'t>,
    ) -> Result<()>;
}

/// Shared to-one behavior: null clears, an existing object is updated in
/// place when `matches` allows it, anything else is replaced
fn reconcile_single<'t>(
    staged: &Staged<'t>,
    sync: &mut dyn ElementSync<'t>,
    matches: impl Fn(&ModelValue, &Staged<'t>) -> bool,
) -> Result<()> {
    if staged.is_null() {
        return sync.set(ModelValue::Null);
    }
    let current = sync.current()?;
    let next = if current.as_object().is_some() && matches(&current, staged) {
        sync.update(&current, staged)?
    } else {
        sync.create(staged)?
    };
    if !next.same(&current) {
        sync.set(next)?;
    }
    Ok(())
}

/// Default manager: collections are cleared and rebuilt from the view
///
/// Element identity is not preserved. A to-one object is still updated in
/// place so that nested objects survive partial updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceAssociationManager;

impl AssociationManager for ReplaceAssociationManager {
    fn reconcile_one<'t>(&self, staged: &Staged<'t>, sync: &mut dyn ElementSync<'t>) -> Result<()> {
        reconcile_single(staged, sync, |_, _| true)
    }

    fn reconcile_list<'t>(
        &self,
        staged: &[Staged<'t>],
        sync: &mut dyn ElementSync<'t>,
    ) -> Result<()> {
        let mut rebuilt = Vec::with_capacity(staged.len());
        for element in staged {
            rebuilt.push(sync.create(element)?);
        }
        sync.clear()?;
        for element in rebuilt {
            sync.add(element)?;
        }
        Ok(())
    }

    fn reconcile_map<'t>(
        &self,
        staged: &IndexMap<String, Staged<'t>>,
        sync: &mut dyn ElementSync<'t>,
    ) -> Result<()> {
        let mut rebuilt = Vec::with_capacity(staged.len());
        for (key, element) in staged {
            rebuilt.push((key, sync.create(element)?));
        }
        sync.set(ModelValue::Map(IndexMap::new()))?;
        for (key, element) in rebuilt {
            sync.put(key, element)?;
        }
        Ok(())
    }
}

/// Identity-preserving manager keyed by a natural identifier
///
/// Elements are matched on `key_property`: staged elements whose key matches
/// an existing element update that element in place; existing elements with
/// no staged counterpart are removed; the rest are created and appended.
/// Map entries match on the map key. Elements without a key (scalars, or
/// objects without the property) are never matched.
#[derive(Debug, Clone)]
pub struct KeyedAssociationManager {
    key_property: String,
}

impl KeyedAssociationManager {
    pub fn new(key_property: impl Into<String>) -> Self {
        Self {
            key_property: key_property.into(),
        }
    }

    fn staged_key<'s>(&self, staged: &'s Staged<'_>) -> Option<&'s ModelValue> {
        staged
            .as_entity()
            .and_then(|e| e.scalar(&self.key_property))
            .filter(|k| !k.is_null())
    }

    fn current_key(&self, value: &ModelValue) -> Option<ModelValue> {
        value
            .as_object()
            .map(|obj| obj.get(&self.key_property))
            .filter(|k| !k.is_null())
    }
}

impl AssociationManager for KeyedAssociationManager {
    fn reconcile_one<'t>(&self, staged: &Staged<'t>, sync: &mut dyn ElementSync<'t>) -> Result<()> {
        reconcile_single(staged, sync, |current, staged| {
            match (self.current_key(current), self.staged_key(staged)) {
                (Some(a), Some(b)) => a == *b,
                _ => false,
            }
        })
    }

    fn reconcile_list<'t>(
        &self,
        staged: &[Staged<'t>],
        sync: &mut dyn ElementSync<'t>,
    ) -> Result<()> {
        let current = match sync.current()? {
            ModelValue::List(items) => items,
            _ => Vec::new(),
        };
        let mut matched = vec![false; current.len()];
        let mut created = Vec::new();

        for element in staged {
            let hit = self.staged_key(element).and_then(|key| {
                current
                    .iter()
                    .enumerate()
                    .find(|(i, existing)| {
                        !matched[*i] && self.current_key(existing).as_ref() == Some(key)
                    })
                    .map(|(i, _)| i)
            });
            match hit {
                Some(i) => {
                    matched[i] = true;
                    let kept = sync.update(&current[i], element)?;
                    if !kept.same(&current[i]) {
                        sync.remove(&current[i])?;
                        created.push(kept);
                    }
                }
                None => created.push(sync.create(element)?),
            }
        }

        for (existing, was_matched) in current.iter().zip(&matched) {
            if !was_matched {
                tracing::trace!(key_property = %self.key_property, "removing unmatched element");
                sync.remove(existing)?;
            }
        }
        for element in created {
            sync.add(element)?;
        }
        Ok(())
    }

    fn reconcile_map<'t>(
        &self,
        staged: &IndexMap<String, Staged<'t>>,
        sync: &mut dyn ElementSync<'t>,
    ) -> Result<()> {
        let current = match sync.current()? {
            ModelValue::Map(map) => map,
            _ => IndexMap::new(),
        };
        for key in current.keys() {
            if !staged.contains_key(key) {
                sync.remove_key(key)?;
            }
        }
        for (key, element) in staged {
            let next = match current.get(key) {
                Some(existing) if existing.as_object().is_some() && !element.is_null() => {
                    sync.update(existing, element)?
                }
                _ => sync.create(element)?,
            };
            if current.get(key).map_or(true, |existing| !next.same(existing)) {
                sync.put(key, next)?;
            }
        }
        Ok(())
    }
}
