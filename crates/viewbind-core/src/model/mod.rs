//! Dynamic object model read and written by accessors

mod factory;
mod types;
mod value;

pub use factory::{BeanFactory, ModelFactory};
pub use types::{TypeName, TypeRegistry};
pub use value::{Bean, ModelValue, ObjectRef};
