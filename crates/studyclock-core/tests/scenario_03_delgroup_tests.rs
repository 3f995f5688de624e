/// Scenario 3: `delgroup`
///
/// Deletion resolves against existing group names, asks when several match,
/// and never calls destroy when nothing matches or the operator backs out.
mod common;

use async_trait::async_trait;
use mockall::mock;
use studyclock_core::errors::{ExErrorKind, Result};
use studyclock_core::lifecycle::GroupLifecycle;
use studyclock_core::registry::filter_groups;
use studyclock_core::{
    BotSettings, Channel, GroupDraft, GroupRegistry, InMemoryDirectory, ReplyKind, Role,
    ScriptedSession, TenantId, TimerGroup,
};

use common::{context, fixture, harness, tenant};

mock! {
    Registry {}

    #[async_trait]
    impl GroupRegistry for Registry {
        async fn create(&self, tenant: &TenantId, draft: &GroupDraft) -> Result<TimerGroup>;
        async fn destroy(&self, group: &TimerGroup) -> Result<()>;
        async fn find_matching(&self, tenant: &TenantId, query: &str) -> Result<Vec<TimerGroup>>;
    }
}

async fn seed_groups(h: &common::Harness, names: &[&str]) {
    let session = ScriptedSession::default();
    let ctx = context(&session, "owner");
    for name in names {
        let reply = h
            .dispatcher
            .dispatch_line(&ctx, &format!("newgroup {}, StudyRole, #study, #study-vc", name))
            .await
            .unwrap();
        assert_eq!(reply.kind, ReplyKind::Success);
    }
}

#[tokio::test]
async fn test_scenario_03_missing_group_is_not_found_without_destroy() {
    // GIVEN no group named Coffee
    let settings = BotSettings::default();
    let directory = InMemoryDirectory::new().with_tenant(tenant(), fixture());
    let mut registry = MockRegistry::new();
    registry
        .expect_find_matching()
        .returning(|_, _| Ok(Vec::new()));
    registry.expect_destroy().never();
    let session = ScriptedSession::default();

    // WHEN deleting Coffee
    let err = GroupLifecycle::new(&directory, &registry, &settings)
        .delete(&tenant(), "Coffee", &session)
        .await
        .unwrap_err();

    // THEN NotFound and nothing was destroyed
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[tokio::test]
async fn test_scenario_03_missing_group_reply() {
    let h = harness();
    let session = ScriptedSession::default();

    let reply = h
        .dispatcher
        .dispatch_line(&context(&session, "owner"), "delgroup Coffee")
        .await
        .unwrap();

    assert_eq!(reply.kind, ReplyKind::Error);
    assert_eq!(reply.text, "No matching groups found!");
}

#[tokio::test]
async fn test_scenario_03_exact_name_deletes_without_prompt() {
    let h = harness();
    seed_groups(&h, &["Coffee", "Coffee Club"]).await;
    let session = ScriptedSession::default();

    let reply = h
        .dispatcher
        .dispatch_line(&context(&session, "owner"), "delgroup coffee")
        .await
        .unwrap();

    assert_eq!(reply.text, "The group `Coffee` has been removed!");
    assert!(session.prompts().is_empty());
    let remaining = h.registry.groups(&tenant());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Coffee Club");
}

#[tokio::test]
async fn test_scenario_03_partial_name_prompts_for_choice() {
    let h = harness();
    seed_groups(&h, &["Espresso", "Espresso Doppio", "Tea"]).await;
    let session = ScriptedSession::new(["2"]);

    let reply = h
        .dispatcher
        .dispatch_line(&context(&session, "owner"), "delgroup espr")
        .await
        .unwrap();

    assert_eq!(reply.kind, ReplyKind::Success);
    assert_eq!(reply.text, "The group `Espresso Doppio` has been removed!");
    assert!(session.prompts()[0].contains("1. Espresso (<#20>)"));
    assert_eq!(h.registry.groups(&tenant()).len(), 2);
}

#[tokio::test]
async fn test_scenario_03_no_argument_lists_every_group() {
    let h = harness();
    seed_groups(&h, &["Espresso", "Tea"]).await;
    let session = ScriptedSession::new(["c"]);

    let reply = h
        .dispatcher
        .dispatch_line(&context(&session, "owner"), "delgroup")
        .await
        .unwrap();

    assert_eq!(
        reply.text,
        "User cancelled group selection. No groups were deleted."
    );
    assert!(session.prompts()[0].contains("Please choose a group:"));
    assert!(session.prompts()[0].contains("2. Tea"));
    assert_eq!(h.registry.groups(&tenant()).len(), 2);
}

#[tokio::test]
async fn test_scenario_03_selection_timeout() {
    let h = harness();
    seed_groups(&h, &["Espresso", "Espresso Doppio"]).await;
    let session = ScriptedSession::default().then_silence();

    let reply = h
        .dispatcher
        .dispatch_line(&context(&session, "owner"), "delgroup Espresso D")
        .await
        .unwrap();

    // Only one group matches `Espresso D`, so it is deleted directly
    assert_eq!(reply.kind, ReplyKind::Success);

    let session = ScriptedSession::default().then_silence();
    seed_groups(&h, &["Espresso Lungo"]).await;
    let reply = h
        .dispatcher
        .dispatch_line(&context(&session, "owner"), "delgroup Esp")
        .await
        .unwrap();
    assert_eq!(
        reply.text,
        "Group selection timed out. No groups were deleted."
    );
    assert_eq!(h.registry.groups(&tenant()).len(), 2);
}

#[tokio::test]
async fn test_scenario_03_names_folding_together_cannot_coexist() {
    // GIVEN a group named Ärger
    let h = harness();
    seed_groups(&h, &["Ärger"]).await;
    let session = ScriptedSession::default();
    let ctx = context(&session, "owner");

    // WHEN creating ärger
    let reply = h
        .dispatcher
        .dispatch_line(&ctx, "newgroup ärger, StudyRole, #study, #study-vc")
        .await
        .unwrap();

    // THEN the name is taken and deleting ärger removes the only match
    assert_eq!(reply.kind, ReplyKind::Error);
    assert!(reply.text.ends_with("No group was created."));
    let reply = h.dispatcher.dispatch_line(&ctx, "delgroup ärger").await.unwrap();
    assert_eq!(reply.text, "The group `Ärger` has been removed!");
    assert!(h.registry.groups(&tenant()).is_empty());
}

#[tokio::test]
async fn test_scenario_03_several_exact_matches_ask_before_destroying() {
    // GIVEN a registry already holding Ärger and ärger
    let settings = BotSettings::default();
    let directory = InMemoryDirectory::new().with_tenant(tenant(), fixture());
    let stored: Vec<TimerGroup> = ["Ärger", "ärger"]
        .into_iter()
        .map(|name| {
            GroupDraft {
                name: name.to_string(),
                role: Role::new(10, "StudyRole"),
                channel: Channel::text(20, "study"),
                clock_channel: None,
            }
            .into_group(tenant())
        })
        .collect();
    let mut registry = MockRegistry::new();
    registry
        .expect_find_matching()
        .returning(move |_, query| Ok(filter_groups(stored.clone(), query)));
    registry
        .expect_destroy()
        .withf(|group| group.name == "ärger")
        .times(1)
        .returning(|_| Ok(()));
    let session = ScriptedSession::new(["2"]);

    // WHEN deleting ärger
    let removed = GroupLifecycle::new(&directory, &registry, &settings)
        .delete(&tenant(), "ärger", &session)
        .await
        .unwrap();

    // THEN the operator picked from both before anything was destroyed
    assert_eq!(removed.name, "ärger");
    assert_eq!(session.prompts().len(), 1);
    assert!(session.prompts()[0].contains("1. Ärger"));
}
