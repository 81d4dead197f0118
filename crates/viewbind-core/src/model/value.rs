use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::types::TypeName;

/// A dynamic model value
///
/// This is what accessors read from and write into. Objects are shared
/// handles, so the same instance may appear at several places in a graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Object(ObjectRef),
    List(Vec<ModelValue>),
    Map(IndexMap<String, ModelValue>),
}

impl ModelValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ModelValue::Null)
    }

    /// True for null, booleans, numbers and text
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ModelValue::Null
                | ModelValue::Bool(_)
                | ModelValue::Int(_)
                | ModelValue::Float(_)
                | ModelValue::Text(_)
        )
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ModelValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ModelValue]> {
        match self {
            ModelValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ModelValue>> {
        match self {
            ModelValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ModelValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Runtime type of an object value
    pub fn type_name(&self) -> Option<TypeName> {
        self.as_object().map(ObjectRef::type_name)
    }

    /// Short label used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelValue::Null => "null",
            ModelValue::Bool(_) => "bool",
            ModelValue::Int(_) => "int",
            ModelValue::Float(_) => "float",
            ModelValue::Text(_) => "text",
            ModelValue::Object(_) => "object",
            ModelValue::List(_) => "list",
            ModelValue::Map(_) => "map",
        }
    }

    /// Identity for objects, equality for everything else
    ///
    /// Collections use this to find the element to remove.
    pub fn same(&self, other: &ModelValue) -> bool {
        match (self, other) {
            (ModelValue::Object(a), ModelValue::Object(b)) => a.same_instance(b),
            (a, b) => a == b,
        }
    }
}

impl From<bool> for ModelValue {
    fn from(b: bool) -> Self {
        ModelValue::Bool(b)
    }
}

impl From<i64> for ModelValue {
    fn from(i: i64) -> Self {
        ModelValue::Int(i)
    }
}

impl From<i32> for ModelValue {
    fn from(i: i32) -> Self {
        ModelValue::Int(i64::from(i))
    }
}

impl From<f64> for ModelValue {
    fn from(f: f64) -> Self {
        ModelValue::Float(f)
    }
}

impl From<&str> for ModelValue {
    fn from(s: &str) -> Self {
        ModelValue::Text(s.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(s: String) -> Self {
        ModelValue::Text(s)
    }
}

impl From<ObjectRef> for ModelValue {
    fn from(obj: ObjectRef) -> Self {
        ModelValue::Object(obj)
    }
}

impl<T: Into<ModelValue>> From<Option<T>> for ModelValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(ModelValue::Null, Into::into)
    }
}

impl From<Vec<ModelValue>> for ModelValue {
    fn from(items: Vec<ModelValue>) -> Self {
        ModelValue::List(items)
    }
}

/// A generic model object: a runtime type plus ordered named properties
#[derive(Debug, Clone, PartialEq)]
pub struct Bean {
    pub type_name: TypeName,
    pub properties: IndexMap<String, ModelValue>,
}

impl Bean {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Builder-style property assignment
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Absent properties read as null
    pub fn get(&self, name: &str) -> ModelValue {
        self.properties.get(name).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: ModelValue) {
        self.properties.insert(name.into(), value);
    }
}

/// Shared, mutable handle to a [`Bean`]
///
/// Cloning the handle does not clone the object. Equality is structural;
/// use [`ObjectRef::same_instance`] for identity. Neither `PartialEq` nor
/// deep inspection is defined for cyclic graphs.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Bean>>);

impl ObjectRef {
    pub fn new(bean: Bean) -> Self {
        Self(Rc::new(RefCell::new(bean)))
    }

    pub fn type_name(&self) -> TypeName {
        self.0.borrow().type_name.clone()
    }

    pub fn get(&self, name: &str) -> ModelValue {
        self.0.borrow().get(name)
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<ModelValue>) {
        self.0.borrow_mut().set(name, value.into());
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.borrow().properties.contains_key(name)
    }

    /// Borrow the underlying bean for inspection
    pub fn bean(&self) -> Ref<'_, Bean> {
        self.0.borrow()
    }

    pub fn same_instance(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address, usable as an identity key while the object is alive
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl From<Bean> for ObjectRef {
    fn from(bean: Bean) -> Self {
        ObjectRef::new(bean)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Shallow on purpose: graphs may contain back references.
        let bean = self.0.borrow();
        write!(f, "{}@{:#x}", bean.type_name, self.address())?;
        f.debug_set().entries(bean.properties.keys()).finish()
    }
}
