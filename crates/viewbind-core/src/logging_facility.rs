//! Structured logging facility
//!
//! - One initialization point, [`init`], selecting an output [`Profile`]
//! - Operation boundary macros (`log_op_start!`, `log_op_end!`,
//!   `log_op_error!`) used by the public engine entry points only
//! - An in-memory capture layer for asserting on log output in tests
//!
//! Traversal internals never log at `info` or above; they emit `debug` and
//! `trace` events (vetoes, skipped unknown properties, resolved references)
//! that are silent unless a filter enables them.
//!
//! ```rust
//! use viewbind_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
pub use viewbind_core_types::schema;
