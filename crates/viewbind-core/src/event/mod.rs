//! Canonical event protocol
//!
//! A view is an ordered, finite sequence of [`Event`]s. Every `Begin*` event
//! has exactly one matching `End*` event carrying the same name and
//! namespace. Codec adapters turn this sequence into bytes and back and must
//! preserve it exactly, including the position of `Discriminator` events
//! (always the first child of their object).

mod cursor;
mod validate;
mod value;

pub use cursor::EventCursor;
pub use validate::validate;
pub use value::ViewValue;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of one step in a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Value,
    Url,
    Discriminator,
}

impl EventKind {
    /// `BeginObject <-> EndObject`, `BeginArray <-> EndArray`, others map to themselves
    pub fn complement(self) -> Self {
        match self {
            EventKind::BeginObject => EventKind::EndObject,
            EventKind::EndObject => EventKind::BeginObject,
            EventKind::BeginArray => EventKind::EndArray,
            EventKind::EndArray => EventKind::BeginArray,
            other => other,
        }
    }

    pub fn is_begin(self) -> bool {
        matches!(self, EventKind::BeginObject | EventKind::BeginArray)
    }

    pub fn is_end(self) -> bool {
        matches!(self, EventKind::EndObject | EventKind::EndArray)
    }

    /// Events that carry a scalar payload
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            EventKind::Value | EventKind::Url | EventKind::Discriminator
        )
    }
}

/// One step in a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ViewValue>,
}

impl Event {
    fn structural(kind: EventKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            namespace: None,
            value: None,
        }
    }

    pub fn begin_object(name: Option<&str>) -> Self {
        Self::structural(EventKind::BeginObject, name)
    }

    pub fn end_object(name: Option<&str>) -> Self {
        Self::structural(EventKind::EndObject, name)
    }

    pub fn begin_array(name: Option<&str>) -> Self {
        Self::structural(EventKind::BeginArray, name)
    }

    pub fn end_array(name: Option<&str>) -> Self {
        Self::structural(EventKind::EndArray, name)
    }

    pub fn value(name: Option<&str>, value: impl Into<ViewValue>) -> Self {
        Self {
            kind: EventKind::Value,
            name: name.map(str::to_string),
            namespace: None,
            value: Some(value.into()),
        }
    }

    pub fn url(name: Option<&str>, value: impl Into<ViewValue>) -> Self {
        Self {
            kind: EventKind::Url,
            name: name.map(str::to_string),
            namespace: None,
            value: Some(value.into()),
        }
    }

    pub fn discriminator(name: &str, value: &str) -> Self {
        Self {
            kind: EventKind::Discriminator,
            name: Some(name.to_string()),
            namespace: None,
            value: Some(ViewValue::Text(value.to_string())),
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    /// The end event that closes this begin event
    pub fn closing(&self) -> Self {
        Self {
            kind: self.kind.complement(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            value: None,
        }
    }

    /// Whether `other` is the matching end of this begin event
    pub fn is_closed_by(&self, other: &Event) -> bool {
        self.kind.is_begin()
            && other.kind == self.kind.complement()
            && other.name == self.name
            && other.namespace == self.namespace
    }

    pub fn is_null_value(&self) -> bool {
        self.kind == EventKind::Value && self.value.as_ref().map_or(true, ViewValue::is_null)
    }

    /// Name for diagnostics; unnamed events render as `<anonymous>`
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(ns) = &self.namespace {
            write!(f, " {{{}}}", ns)?;
        }
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        if let Some(value) = &self.value {
            write!(f, " = {}", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_is_an_involution() {
        for kind in [
            EventKind::BeginObject,
            EventKind::EndObject,
            EventKind::BeginArray,
            EventKind::EndArray,
            EventKind::Value,
            EventKind::Url,
            EventKind::Discriminator,
        ] {
            assert_eq!(kind.complement().complement(), kind);
        }
        assert_eq!(EventKind::Value.complement(), EventKind::Value);
    }

    #[test]
    fn test_closing_matches_name_and_namespace() {
        let begin = Event::begin_object(Some("person")).with_namespace(Some("urn:x"));
        assert!(begin.is_closed_by(&begin.closing()));
        assert!(!begin.is_closed_by(&Event::end_object(Some("person"))));
        assert!(!begin.is_closed_by(&Event::end_array(Some("person")).with_namespace(Some("urn:x"))));
    }

    #[test]
    fn test_display() {
        let event = Event::value(Some("age"), 42i64);
        assert_eq!(event.to_string(), "Value age = 42");
        assert_eq!(Event::begin_array(None).to_string(), "BeginArray");
    }

    #[test]
    fn test_serde_omits_absent_fields() {
        let json = serde_json::to_string(&Event::begin_object(Some("a"))).unwrap();
        assert_eq!(json, r#"{"kind":"BeginObject","name":"a"}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Event::begin_object(Some("a")));
    }
}
