//! Logging initialization

use std::str::FromStr;
use std::sync::Once;

use serde::Deserialize;
use studyclock_core_types::RequestContext;
use tracing_subscriber::EnvFilter;

use crate::errors::{ExError, ExErrorKind};

/// Logging profile, selected from `BotSettings::log_profile`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output at debug level
    #[default]
    Development,
    /// JSON lines at info level
    Production,
    /// No output; events go to the in-memory capture layer
    Test,
}

impl FromStr for Profile {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("logging_init")
                .with_entity(other)
                .with_message("unknown log profile")),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Logs go to stderr; stdout belongs to the front end's replies.
///
/// Only the first call has any effect, and a subscriber installed earlier
/// (such as the test capture layer) is left in place. `RUST_LOG` overrides
/// the profile's default filter.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("studyclock=debug")),
                )
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init()
                .ok();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_current_span(true)
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("studyclock=info")),
                )
                .try_init()
                .ok();
        }
        Profile::Test => {
            super::test_capture::init_test_capture();
        }
    });
}

/// Span wrapping one command invocation.
///
/// Events emitted inside it inherit the request and trace ids, so a whole
/// wizard conversation can be followed from the logs.
pub fn command_span(command: &str, ctx: &RequestContext, tenant: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "command",
        command = command,
        request_id = ctx.request_id.as_str(),
        trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()).unwrap_or(""),
        tenant_id = tenant.unwrap_or(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("production".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!(" Dev ".parse::<Profile>().unwrap(), Profile::Development);
        let err = "verbose".parse::<Profile>().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_profile_default_is_development() {
        assert_eq!(Profile::default(), Profile::Development);
    }
}
