use studyclock_core::{
    Channel, ExErrorKind, GroupDraft, GroupRegistry, Role, TenantId,
};
use studyclock_store::{db, SqliteGroupRegistry};
use tempfile::tempdir;

fn draft(name: &str) -> GroupDraft {
    GroupDraft {
        name: name.to_string(),
        role: Role::new(10, "StudyRole"),
        channel: Channel::text(20, "study"),
        clock_channel: Some(Channel::voice(21, "study-vc")),
    }
}

fn registry() -> SqliteGroupRegistry {
    SqliteGroupRegistry::new(db::open_shared_in_memory().unwrap())
}

#[tokio::test]
async fn test_create_then_find_by_exact_name() {
    let registry = registry();
    let tenant = TenantId::new("g1");

    let created = registry.create(&tenant, &draft("Espresso")).await.unwrap();
    let found = registry.find_matching(&tenant, "espresso").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Espresso");
    assert_eq!(found[0].role, created.role);
    assert_eq!(found[0].clock_channel, created.clock_channel);
    assert_eq!(
        found[0].created_at.timestamp_millis(),
        created.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn test_duplicate_name_ignoring_case_is_rejected() {
    let registry = registry();
    let tenant = TenantId::new("g1");
    registry.create(&tenant, &draft("Espresso")).await.unwrap();

    let err = registry
        .create(&tenant, &draft("ESPRESSO"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);

    // Other tenants may reuse the name
    registry
        .create(&TenantId::new("g2"), &draft("Espresso"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_names_folding_together_are_rejected() {
    let registry = registry();
    let tenant = TenantId::new("g1");
    registry.create(&tenant, &draft("Ärger")).await.unwrap();

    let err = registry.create(&tenant, &draft("ärger")).await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);

    let found = registry.find_matching(&tenant, "ÄRGER").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Ärger");
}

#[tokio::test]
async fn test_partial_query_returns_groups_in_creation_order() {
    let registry = registry();
    let tenant = TenantId::new("g1");
    for name in ["Latte Club", "Espresso", "Latte Night"] {
        registry.create(&tenant, &draft(name)).await.unwrap();
    }

    let names: Vec<_> = registry
        .find_matching(&tenant, "latte")
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["Latte Club", "Latte Night"]);

    assert_eq!(registry.find_matching(&tenant, "").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_destroy_removes_and_reports_missing() {
    let registry = registry();
    let tenant = TenantId::new("g1");
    let group = registry.create(&tenant, &draft("Espresso")).await.unwrap();

    registry.destroy(&group).await.unwrap();
    assert!(registry.list(&tenant).unwrap().is_empty());

    let err = registry.destroy(&group).await.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[tokio::test]
async fn test_group_without_clock_channel_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("groups.db");
    let tenant = TenantId::new("g1");

    {
        let registry = SqliteGroupRegistry::new(db::open_shared(&path).unwrap());
        let mut plain = draft("Quiet Hours");
        plain.clock_channel = None;
        registry.create(&tenant, &plain).await.unwrap();
    }

    let registry = SqliteGroupRegistry::new(db::open_shared(&path).unwrap());
    let groups = registry.list(&tenant).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].clock_channel, None);
}
