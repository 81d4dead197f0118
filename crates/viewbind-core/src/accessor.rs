//! Property accessors: how a node reads and writes its slice of the model
//!
//! The engine never inspects model objects directly. Everything goes
//! through an [`Accessor`] attached to the node, so any object model that can
//! be expressed as [`ModelValue`]s can be bound to a template.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::converter::DataType;
use crate::errors::{Result, ViewError};
use crate::model::{ModelValue, ObjectRef};

/// Read/write capability for one property of a model object
///
/// The multi-valued operations have default implementations in terms of
/// `get`/`set`; accessors over native collections can override them.
pub trait Accessor: Send + Sync {
    /// # Errors
    ///
    /// Returns `Accessor` or `TypeMismatch` when the property cannot be read.
    fn get(&self, model: &ModelValue) -> Result<ModelValue>;

    /// # Errors
    ///
    /// Returns `Accessor` when the property is read-only or the model is not writable.
    fn set(&self, model: &ModelValue, value: ModelValue) -> Result<()>;

    fn data_type(&self) -> DataType {
        DataType::Any
    }

    /// Property name for diagnostics
    fn name(&self) -> &str;

    /// Current elements of a list-valued property (null reads as empty)
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the property is not a list.
    fn iter(&self, model: &ModelValue) -> Result<Vec<ModelValue>> {
        match self.get(model)? {
            ModelValue::Null => Ok(Vec::new()),
            ModelValue::List(items) => Ok(items),
            other => Err(ViewError::type_mismatch(format!(
                "property '{}' holds {} where a list was expected",
                self.name(),
                other.kind_name()
            ))),
        }
    }

    /// # Errors
    ///
    /// Propagates read and write failures.
    fn add(&self, model: &ModelValue, element: ModelValue) -> Result<()> {
        let mut items = self.iter(model)?;
        items.push(element);
        self.set(model, ModelValue::List(items))
    }

    /// Remove the first element that is the same as `element`
    ///
    /// # Errors
    ///
    /// Propagates read and write failures.
    fn remove(&self, model: &ModelValue, element: &ModelValue) -> Result<bool> {
        let mut items = self.iter(model)?;
        match items.iter().position(|item| item.same(element)) {
            Some(index) => {
                items.remove(index);
                self.set(model, ModelValue::List(items))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// # Errors
    ///
    /// Propagates write failures.
    fn clear(&self, model: &ModelValue) -> Result<()> {
        self.set(model, ModelValue::List(Vec::new()))
    }

    /// Current entries of a map-valued property (null reads as empty)
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the property is not a map.
    fn entries(&self, model: &ModelValue) -> Result<IndexMap<String, ModelValue>> {
        match self.get(model)? {
            ModelValue::Null => Ok(IndexMap::new()),
            ModelValue::Map(map) => Ok(map),
            other => Err(ViewError::type_mismatch(format!(
                "property '{}' holds {} where a map was expected",
                self.name(),
                other.kind_name()
            ))),
        }
    }

    /// # Errors
    ///
    /// Propagates read and write failures.
    fn put(&self, model: &ModelValue, key: &str, element: ModelValue) -> Result<()> {
        let mut map = self.entries(model)?;
        map.insert(key.to_string(), element);
        self.set(model, ModelValue::Map(map))
    }

    /// # Errors
    ///
    /// Propagates read and write failures.
    fn remove_key(&self, model: &ModelValue, key: &str) -> Result<bool> {
        let mut map = self.entries(model)?;
        let removed = map.shift_remove(key).is_some();
        if removed {
            self.set(model, ModelValue::Map(map))?;
        }
        Ok(removed)
    }
}

fn object_of<'m>(model: &'m ModelValue, property: &str) -> Result<&'m ObjectRef> {
    model.as_object().ok_or_else(|| {
        ViewError::accessor(
            property,
            format!("expected an object, found {}", model.kind_name()),
        )
    })
}

/// Named property of a [`crate::model::Bean`]
#[derive(Debug, Clone)]
pub struct PropertyAccessor {
    name: String,
    data_type: DataType,
}

impl PropertyAccessor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Any,
        }
    }

    pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl Accessor for PropertyAccessor {
    fn get(&self, model: &ModelValue) -> Result<ModelValue> {
        if model.is_null() {
            return Ok(ModelValue::Null);
        }
        Ok(object_of(model, &self.name)?.get(&self.name))
    }

    fn set(&self, model: &ModelValue, value: ModelValue) -> Result<()> {
        object_of(model, &self.name)?.set(self.name.as_str(), value);
        Ok(())
    }

    fn data_type(&self) -> DataType {
        self.data_type.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

type Getter = dyn Fn(&ModelValue) -> Result<ModelValue> + Send + Sync;
type Setter = dyn Fn(&ModelValue, ModelValue) -> Result<()> + Send + Sync;

/// Computed property backed by closures; read-only without a setter
#[derive(Clone)]
pub struct FnAccessor {
    name: String,
    data_type: DataType,
    getter: Arc<Getter>,
    setter: Option<Arc<Setter>>,
}

impl FnAccessor {
    pub fn read_only<G>(name: impl Into<String>, getter: G) -> Self
    where
        G: Fn(&ModelValue) -> Result<ModelValue> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            data_type: DataType::Any,
            getter: Arc::new(getter),
            setter: None,
        }
    }

    pub fn with_setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&ModelValue, ModelValue) -> Result<()> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

impl fmt::Debug for FnAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAccessor")
            .field("name", &self.name)
            .field("writable", &self.setter.is_some())
            .finish_non_exhaustive()
    }
}

impl Accessor for FnAccessor {
    fn get(&self, model: &ModelValue) -> Result<ModelValue> {
        (self.getter)(model)
    }

    fn set(&self, model: &ModelValue, value: ModelValue) -> Result<()> {
        match &self.setter {
            Some(setter) => setter(model, value),
            None => Err(ViewError::accessor(&self.name, "property is read-only")),
        }
    }

    fn data_type(&self) -> DataType {
        self.data_type.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
