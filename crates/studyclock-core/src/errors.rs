use studyclock_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical structured error
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure raised by the command core is classified by one of these
/// kinds. The prompt loop decides between "ask again" and "abort" purely by
/// kind, and the dispatcher picks the user-facing message by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Conversation outcomes
    /// The operator replied with the cancel token
    Cancelled,
    /// No reply arrived before the prompt deadline
    TimedOut,

    // Resolution
    NotFound,
    /// More than one candidate matched; consumed inside the resolver
    Ambiguous,

    // Authorization
    PermissionDenied,
    /// A command precondition (tenant scope, registry readiness) failed
    GuardDenied,

    // Validation
    InvalidInput,
    AlreadyExists,

    // Integration/IO
    Persistence,
    Transport,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::TimedOut => "ERR_TIMED_OUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Ambiguous => "ERR_AMBIGUOUS",
            ExErrorKind::PermissionDenied => "ERR_PERMISSION_DENIED",
            ExErrorKind::GuardDenied => "ERR_GUARD_DENIED",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a prompt loop may re-ask after this failure.
    ///
    /// Only `NotFound` is recovered locally; every other kind aborts the
    /// surrounding conversation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExErrorKind::NotFound)
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    tenant_id: Option<String>,
    entity: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            tenant_id: None,
            entity: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add tenant context
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Add the name or id of the object the error is about
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the tenant context, if any
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(tenant_id) = &self.tenant_id {
            write!(f, " (tenant_id: {})", tenant_id)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain-level failures raised by validation in the command core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A group with this name already exists in the tenant
    #[error("A group named `{name}` already exists")]
    GroupNameTaken { name: String },

    /// The group name is empty after trimming
    #[error("Group name cannot be empty")]
    EmptyGroupName,

    /// The value does not have the type the setting requires
    #[error("Setting `{key}` expects {expected}")]
    SettingTypeMismatch { key: String, expected: String },

    /// A command option outside the accepted set
    #[error("Unrecognised option `{option}`. Use `on` or `off`.")]
    UnknownOption { option: String },

    /// The command name is not part of the command surface
    #[error("Unknown command `{name}`")]
    UnknownCommand { name: String },
}

impl From<DomainError> for ExError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::GroupNameTaken { name } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity(name)
                .with_message(message),
            DomainError::EmptyGroupName => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            DomainError::SettingTypeMismatch { key, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity(key)
                    .with_message(message)
            }
            DomainError::UnknownOption { option } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity(option)
                .with_message(message),
            DomainError::UnknownCommand { name } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity(name)
                .with_message(message),
        }
    }
}
