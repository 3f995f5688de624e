//! Field keys and event names shared by the logging macros, the command
//! span and the test capture layer

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Set on the command span
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_TENANT_ID: &str = "tenant_id";

// Set by `log_op_error!`
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
