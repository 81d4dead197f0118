//! Value converters between model scalars and view scalars

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ViewError};
use crate::event::ViewValue;
use crate::model::ModelValue;

/// Declared data type of a scalar property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    Any,
    Bool,
    Int,
    Float,
    Text,
    Url,
    /// Application-defined type handled by a registered converter
    Custom(String),
}

impl DataType {
    pub fn custom(name: impl Into<String>) -> Self {
        DataType::Custom(name.into())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Custom(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Converts scalar values between model and view representation
pub trait ValueConverter: Send + Sync {
    /// Whether this converter handles properties of `data_type`
    fn supports(&self, data_type: &DataType) -> bool;

    /// # Errors
    ///
    /// Returns `Conversion` when the model value has no view representation.
    fn to_view_value(&self, value: &ModelValue) -> Result<ViewValue>;

    /// # Errors
    ///
    /// Returns `Conversion` when the view value cannot become a `data_type`.
    fn to_model_value(&self, value: &ViewValue, data_type: &DataType) -> Result<ModelValue>;
}

/// Built-in fallback: scalars map onto scalars, with lossless coercions
/// toward the declared data type
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarConverter;

impl ValueConverter for ScalarConverter {
    fn supports(&self, data_type: &DataType) -> bool {
        !matches!(data_type, DataType::Custom(_))
    }

    fn to_view_value(&self, value: &ModelValue) -> Result<ViewValue> {
        match value {
            ModelValue::Null => Ok(ViewValue::Null),
            ModelValue::Bool(b) => Ok(ViewValue::Bool(*b)),
            ModelValue::Int(i) => Ok(ViewValue::Int(*i)),
            ModelValue::Float(x) => Ok(ViewValue::Float(*x)),
            ModelValue::Text(s) => Ok(ViewValue::Text(s.clone())),
            other => Err(ViewError::conversion(format!(
                "{} value has no scalar view representation",
                other.kind_name()
            ))),
        }
    }

    fn to_model_value(&self, value: &ViewValue, data_type: &DataType) -> Result<ModelValue> {
        let mismatch = || {
            ViewError::conversion(format!("cannot convert {} to {}", value, data_type))
        };
        let converted = match (data_type, value) {
            (_, ViewValue::Null) => ModelValue::Null,

            (DataType::Any, ViewValue::Bool(b)) => ModelValue::Bool(*b),
            (DataType::Any, ViewValue::Int(i)) => ModelValue::Int(*i),
            (DataType::Any, ViewValue::Float(x)) => ModelValue::Float(*x),
            (DataType::Any, ViewValue::Text(s)) => ModelValue::Text(s.clone()),

            (DataType::Bool, ViewValue::Bool(b)) => ModelValue::Bool(*b),
            (DataType::Bool, ViewValue::Text(s)) => match s.as_str() {
                "true" => ModelValue::Bool(true),
                "false" => ModelValue::Bool(false),
                _ => return Err(mismatch()),
            },

            (DataType::Int, ViewValue::Int(i)) => ModelValue::Int(*i),
            (DataType::Int, ViewValue::Float(x)) => {
                ModelValue::Int(float_to_int(*x).ok_or_else(mismatch)?)
            }
            (DataType::Int, ViewValue::Text(s)) => {
                ModelValue::Int(s.trim().parse().map_err(|_| mismatch())?)
            }

            (DataType::Float, ViewValue::Float(x)) => ModelValue::Float(*x),
            (DataType::Float, ViewValue::Int(i)) => {
                ModelValue::Float(int_to_float(*i).ok_or_else(mismatch)?)
            }
            (DataType::Float, ViewValue::Text(s)) => {
                ModelValue::Float(s.trim().parse().map_err(|_| mismatch())?)
            }

            (DataType::Text | DataType::Url, ViewValue::Text(s)) => ModelValue::Text(s.clone()),
            (DataType::Text, ViewValue::Int(i)) => ModelValue::Text(i.to_string()),
            (DataType::Text, ViewValue::Float(x)) => ModelValue::Text(x.to_string()),
            (DataType::Text, ViewValue::Bool(b)) => ModelValue::Text(b.to_string()),

            _ => return Err(mismatch()),
        };
        Ok(converted)
    }
}

/// 2^63, the first float past the `i64` range
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Integral floats inside the `i64` range only
fn float_to_int(x: f64) -> Option<i64> {
    (x.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&x)).then_some(x as i64)
}

/// Integers an `f64` represents exactly
fn int_to_float(i: i64) -> Option<f64> {
    let x = i as f64;
    (x < I64_BOUND && x as i64 == i).then_some(x)
}

type ToView = dyn Fn(&ModelValue) -> Result<ViewValue> + Send + Sync;
type ToModel = dyn Fn(&ViewValue) -> Result<ModelValue> + Send + Sync;

/// Converter for one custom data type built from a pair of closures
#[derive(Clone)]
pub struct FnConverter {
    data_type: DataType,
    to_view: Arc<ToView>,
    to_model: Arc<ToModel>,
}

impl FnConverter {
    pub fn new<V, M>(data_type: DataType, to_view: V, to_model: M) -> Self
    where
        V: Fn(&ModelValue) -> Result<ViewValue> + Send + Sync + 'static,
        M: Fn(&ViewValue) -> Result<ModelValue> + Send + Sync + 'static,
    {
        Self {
            data_type,
            to_view: Arc::new(to_view),
            to_model: Arc::new(to_model),
        }
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter")
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

impl ValueConverter for FnConverter {
    fn supports(&self, data_type: &DataType) -> bool {
        *data_type == self.data_type
    }

    fn to_view_value(&self, value: &ModelValue) -> Result<ViewValue> {
        if value.is_null() {
            return Ok(ViewValue::Null);
        }
        (self.to_view)(value)
    }

    fn to_model_value(&self, value: &ViewValue, _data_type: &DataType) -> Result<ModelValue> {
        if value.is_null() {
            return Ok(ModelValue::Null);
        }
        (self.to_model)(value)
    }
}
