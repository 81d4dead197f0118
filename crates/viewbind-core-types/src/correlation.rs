//! Correlation identifiers for generate/apply calls
//!
//! Every top-level traversal carries a [`RequestContext`] so that log events
//! and structured errors produced by one call can be tied back together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh, time-ordered identifier (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Wrap an identifier received from a caller
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifies one generate or apply invocation
    RequestId
);

correlation_id!(
    /// Identifies a caller-level trace spanning several invocations
    TraceId
);

correlation_id!(
    /// Identifies a nested unit of work inside a trace
    SpanId
);

/// Correlation data carried by a traversal context
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
    pub span_id: Option<SpanId>,
}

impl RequestContext {
    /// Create a context with a fresh RequestId and no trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a caller-supplied RequestId
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
            span_id: None,
        }
    }

    /// Attach the caller's trace
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Derive a context for a nested call: same request and trace, new span
    pub fn child(&self) -> Self {
        Self {
            request_id: self.request_id.clone(),
            trace_id: self.trace_id.clone(),
            span_id: Some(SpanId::new()),
        }
    }
}
