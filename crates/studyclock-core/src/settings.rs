//! Runtime settings for the command core

use std::time::Duration;

use serde::Deserialize;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;

/// Tunables shared by every command invocation
///
/// Deserialized by the front end from layered configuration sources; every
/// field has a default so an empty source is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Deadline for each free-text wizard prompt
    pub prompt_timeout_secs: u64,
    /// Deadline for each numbered disambiguation prompt
    pub selection_timeout_secs: u64,
    /// Longest list shown in a disambiguation menu
    pub max_choices: usize,
    pub log_profile: Profile,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prompt_timeout_secs: 120,
            selection_timeout_secs: 60,
            max_choices: 20,
            log_profile: Profile::Development,
        }
    }
}

impl BotSettings {
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    pub fn selection_timeout(&self) -> Duration {
        Duration::from_secs(self.selection_timeout_secs)
    }

    /// Reject values that would make every prompt fail immediately
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("settings_validate")
                .with_entity(field)
                .with_message("must be greater than zero")
        };
        if self.prompt_timeout_secs == 0 {
            return Err(invalid("prompt_timeout_secs"));
        }
        if self.selection_timeout_secs == 0 {
            return Err(invalid("selection_timeout_secs"));
        }
        if self.max_choices == 0 {
            return Err(invalid("max_choices"));
        }
        Ok(())
    }
}
