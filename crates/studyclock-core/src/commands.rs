//! Command surface: the four configuration commands and their arguments

use crate::errors::{DomainError, Result};
use crate::guards::GuardChain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a group, directly or through the wizard
    NewGroup { args: String },
    /// Delete the group matching `query`; empty matches every group
    DelGroup { query: String },
    /// View (`None`) or set the timer admin role
    AdminRole { role: Option<String> },
    /// View (`None`) or set group visibility (`on`/`off`)
    GlobalGroups { option: Option<String> },
}

impl Command {
    /// Parse `<name> [arguments]`. Command names are case-insensitive; the
    /// argument string is kept as typed, minus surrounding whitespace.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an unknown command name.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let optional = || (!rest.is_empty()).then(|| rest.to_string());

        match name.to_ascii_lowercase().as_str() {
            "newgroup" => Ok(Command::NewGroup {
                args: rest.to_string(),
            }),
            "delgroup" => Ok(Command::DelGroup {
                query: rest.to_string(),
            }),
            "adminrole" => Ok(Command::AdminRole { role: optional() }),
            "globalgroups" => Ok(Command::GlobalGroups { option: optional() }),
            _ => Err(DomainError::UnknownCommand {
                name: name.to_string(),
            }
            .into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::NewGroup { .. } => "newgroup",
            Command::DelGroup { .. } => "delgroup",
            Command::AdminRole { .. } => "adminrole",
            Command::GlobalGroups { .. } => "globalgroups",
        }
    }

    /// Preconditions evaluated before the handler runs.
    ///
    /// Config commands only need a tenant here; their write rules are
    /// enforced by the config store.
    pub fn guards(&self) -> GuardChain {
        match self {
            Command::NewGroup { .. } | Command::DelGroup { .. } => GuardChain::group_management(),
            Command::AdminRole { .. } | Command::GlobalGroups { .. } => GuardChain::tenant_only(),
        }
    }
}

/// Whether a reply reports success, information or a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Success,
    Info,
    Error,
}

/// The single message a command produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub kind: ReplyKind,
    pub text: String,
}

impl CommandReply {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Error,
            text: text.into(),
        }
    }
}
