use studyclock_core::errors::{DomainError, ExError, ExErrorKind};
use studyclock_core_types::RequestId;

#[test]
fn test_error_kind_code_mapping() {
    // Each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::Cancelled, "ERR_CANCELLED"),
        (ExErrorKind::TimedOut, "ERR_TIMED_OUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Ambiguous, "ERR_AMBIGUOUS"),
        (ExErrorKind::PermissionDenied, "ERR_PERMISSION_DENIED"),
        (ExErrorKind::GuardDenied, "ERR_GUARD_DENIED"),
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::AlreadyExists, "ERR_ALREADY_EXISTS"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Transport, "ERR_TRANSPORT"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, code) in kinds {
        assert_eq!(kind.code(), code);
        assert!(seen.insert(code), "duplicate code {}", code);
    }
}

#[test]
fn test_unknown_option_is_invalid_input_naming_option() {
    let ex_err: ExError = DomainError::UnknownOption {
        option: "maybe".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.entity(), Some("maybe"));
    assert!(ex_err.message().starts_with("Unrecognised option `maybe`"));
}

#[test]
fn test_setting_type_mismatch_structured_fields() {
    let ex_err: ExError = DomainError::SettingTypeMismatch {
        key: "globalgroups".to_string(),
        expected: "on or off".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.entity(), Some("globalgroups"));
    assert!(ex_err.message().contains("on or off"));
}

#[test]
fn test_builder_context_is_preserved() {
    let request_id = RequestId::new();
    let err = ExError::new(ExErrorKind::NotFound)
        .with_op("group_delete")
        .with_tenant("guild-1")
        .with_entity("Coffee")
        .with_request_id(request_id.clone());

    assert_eq!(err.op(), Some("group_delete"));
    assert_eq!(err.tenant_id(), Some("guild-1"));
    assert_eq!(err.entity(), Some("Coffee"));
    assert_eq!(err.request_id(), Some(&request_id));

    let rendered = err.to_string();
    assert!(rendered.contains("tenant_id: guild-1"));
    assert!(rendered.contains("entity: Coffee"));
}

#[test]
fn test_abort_kinds_are_not_recoverable() {
    for kind in [
        ExErrorKind::Cancelled,
        ExErrorKind::TimedOut,
        ExErrorKind::PermissionDenied,
    ] {
        assert!(!kind.is_recoverable());
    }
    assert!(ExErrorKind::NotFound.is_recoverable());
}
