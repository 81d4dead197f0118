//! Canonical schema constants for structured logging and events
//!
//! These constants keep log field names identical across the generation and
//! application paths.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_SPAN_ID: &str = "span_id";

// Traversal context
pub const FIELD_NODE_PATH: &str = "node_path";
pub const FIELD_ROOT_TYPE: &str = "root_type";
pub const FIELD_PROPERTY: &str = "property";

// Stream sizes
pub const FIELD_EVENT_COUNT: &str = "event_count";
pub const FIELD_SKIPPED_EVENTS: &str = "skipped_events";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_error_fields_are_namespaced() {
        assert!(FIELD_ERR_KIND.starts_with("err_"));
        assert!(FIELD_ERR_CODE.starts_with("err_"));
    }
}
