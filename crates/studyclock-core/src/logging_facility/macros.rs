//! Operation logging macros
//!
//! Every command and wizard step brackets its work with these so the
//! start/end pairs line up in captured logs.

/// Log the start of an operation
///
/// ```
/// # use studyclock_core::log_op_start;
/// log_op_start!("newgroup");
/// log_op_start!("newgroup", tenant_id = "guild-1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = studyclock_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = studyclock_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use studyclock_core::log_op_end;
/// log_op_end!("newgroup", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = studyclock_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = studyclock_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation that ended in an error.
///
/// Cancellations and timeouts are ordinary conversation outcomes and are
/// logged at info; everything else at error.
///
/// ```
/// # use studyclock_core::log_op_error;
/// # use studyclock_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::NotFound);
/// log_op_error!("delgroup", &err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {
        $crate::log_op_error!($op, $err, duration_ms = $duration,)
    };
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = ::std::clone::Clone::clone($err).into();
        match ex_err.kind() {
            $crate::errors::ExErrorKind::Cancelled | $crate::errors::ExErrorKind::TimedOut => {
                tracing::info!(
                    component = module_path!(),
                    op = $op,
                    event = studyclock_core_types::schema::EVENT_END_ERROR,
                    duration_ms = $duration,
                    err_kind = ?ex_err.kind(),
                    err_code = ex_err.code(),
                    $($field)*
                );
            }
            _ => {
                tracing::error!(
                    component = module_path!(),
                    op = $op,
                    event = studyclock_core_types::schema::EVENT_END_ERROR,
                    duration_ms = $duration,
                    err_kind = ?ex_err.kind(),
                    err_code = ex_err.code(),
                    $($field)*
                );
            }
        }
    }};
}
