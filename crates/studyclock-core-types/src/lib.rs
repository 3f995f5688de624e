//! Core types shared across studyclock crates
//!
//! This crate provides foundational types used by the error and logging
//! facilities of the command core:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
