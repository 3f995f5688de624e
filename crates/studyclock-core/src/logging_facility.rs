//! Structured logging for the studyclock command core
//!
//! - One initialization point, `init(profile)`, safe to call repeatedly
//! - Operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - A `command_span` carrying correlation fields for one invocation
//! - An in-memory capture layer for deterministic assertions in tests
//!
//! ```rust
//! use studyclock_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{command_span, init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
