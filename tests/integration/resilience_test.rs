//! Integration tests for failure isolation, retries and the concurrency
//! bound.

mod helpers;

use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::Instant;

use orgshare_core::error::ErrorKind;
use orgshare_core::events::SharingEvent;
use orgshare_core::types::{OrganizationId, UserId};
use orgshare_entity::{GeneralShareRequest, SelectiveShareRequest};
use orgshare_memory::{AssociationCall, Fault};

fn share_everywhere(users: &[UserId], roles: Value) -> GeneralShareRequest {
    helpers::request(json!({
        "userCriteria": { "userIds": users },
        "policy": "ALL_EXISTING_ORGS_ONLY",
        "roles": roles
    }))
}

fn editor() -> Value {
    json!({ "roleName": "editor", "audienceName": "Root", "audienceType": "organization" })
}

async fn creates_in(app: &helpers::TestApp, organization_id: OrganizationId) -> usize {
    app.associations
        .calls()
        .await
        .iter()
        .filter(|call| matches!(
            call,
            AssociationCall::Create { target_organization_id, .. } if *target_organization_id == organization_id
        ))
        .count()
}

fn failures(seen: &[SharingEvent]) -> Vec<(Option<OrganizationId>, String)> {
    seen.iter()
        .filter_map(|event| match event {
            SharingEvent::UnitFailed {
                organization_id,
                operation,
                ..
            } => Some((*organization_id, operation.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_permanent_failure_is_isolated_to_its_unit() {
    let app = helpers::TestApp::new().await;
    let (alice, t) = (app.people.alice, app.tree);
    app.faults
        .inject("create_association", Some(t.a1), None, Fault::Error(ErrorKind::Conflict))
        .await;
    let mut events = app.service.subscribe();

    app.service
        .share_general(&app.ctx, Some(share_everywhere(&[alice], json!([editor()]))))
        .unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    // Permanent errors are not retried.
    assert_eq!(creates_in(&app, t.a1).await, 1);
    assert_eq!(
        app.shared_orgs(alice).await,
        helpers::sorted(vec![t.a, t.a1x, t.a2, t.b])
    );
    assert_eq!(
        failures(&seen),
        vec![(Some(t.a1), "create_association".to_string())]
    );
    assert_eq!(report.shared, 4);
    assert_eq!(report.roles_granted, 4);
    assert_eq!(report.failures, 1);

    let stats = app.service.stats();
    assert_eq!(stats.unit_failures, 1);
    assert_eq!(stats.retries, 0);
    assert_eq!(stats.completed, 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let app = helpers::TestApp::new().await;
    let (alice, a) = (app.people.alice, app.tree.a);
    app.faults
        .inject(
            "create_association",
            Some(a),
            Some(2),
            Fault::Error(ErrorKind::ServiceUnavailable),
        )
        .await;

    let request: SelectiveShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [alice] },
        "organizations": [{ "orgId": a, "policy": "SELECTED_ORG_ONLY", "roles": [] }]
    }));
    app.service.share_selective(&app.ctx, Some(request)).unwrap();
    app.settle().await;

    assert_eq!(creates_in(&app, a).await, 3);
    assert_eq!(app.shared_orgs(alice).await, vec![a]);

    let stats = app.service.stats();
    assert_eq!(stats.retries, 2);
    assert_eq!(stats.unit_failures, 0);
    assert_eq!(stats.associations_created, 1);
}

#[tokio::test]
async fn test_transient_failure_gives_up_after_max_attempts() {
    let app = helpers::TestApp::new().await;
    let (alice, b) = (app.people.alice, app.tree.b);
    app.faults
        .inject(
            "create_association",
            Some(b),
            None,
            Fault::Error(ErrorKind::ExternalService),
        )
        .await;
    let mut events = app.service.subscribe();

    app.service
        .share_general(&app.ctx, Some(share_everywhere(&[alice], json!([]))))
        .unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert_eq!(creates_in(&app, b).await, helpers::test_config().max_attempts as usize);
    assert_eq!(failures(&seen), vec![(Some(b), "create_association".to_string())]);
    assert_eq!(report.shared, 4);
    assert_eq!(app.service.stats().retries, 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_call_times_out_and_is_retried() {
    let app = helpers::TestApp::new().await;
    let (alice, a) = (app.people.alice, app.tree.a);
    let timeout = Duration::from_millis(helpers::test_config().operation_timeout_ms);
    app.faults
        .inject("create_association", Some(a), Some(1), Fault::Delay(timeout * 2))
        .await;

    let request: SelectiveShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [alice] },
        "organizations": [{ "orgId": a, "policy": "SELECTED_ORG_ONLY", "roles": [] }]
    }));
    app.service.share_selective(&app.ctx, Some(request)).unwrap();
    app.settle().await;

    assert_eq!(creates_in(&app, a).await, 2);
    assert_eq!(app.shared_orgs(alice).await, vec![a]);
    assert_eq!(app.service.stats().retries, 1);
    assert_eq!(app.service.stats().unit_failures, 0);
}

#[tokio::test]
async fn test_unknown_role_does_not_block_sharing() {
    let app = helpers::TestApp::new().await;
    let (p, t) = (app.people, app.tree);
    let mut events = app.service.subscribe();

    let request: SelectiveShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [p.alice, p.bob] },
        "organizations": [{
            "orgId": t.b,
            "policy": "SELECTED_ORG_ONLY",
            "roles": [
                { "roleName": "ghost", "audienceName": "Root", "audienceType": "organization" },
                editor()
            ]
        }]
    }));
    app.service.share_selective(&app.ctx, Some(request)).unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert_eq!(app.roles.resolve_count("ghost").await, 1);
    assert_eq!(app.shared_orgs(p.alice).await, vec![t.b]);
    assert_eq!(app.shared_orgs(p.bob).await, vec![t.b]);

    let grants = app.roles.grants().await;
    assert_eq!(grants.len(), 2);
    assert!(grants.iter().all(|g| g.role_id == app.role_ids.editor));

    // One failure per user that would have received the role.
    assert_eq!(
        failures(&seen),
        vec![
            (Some(t.b), "role_id_by_name".to_string()),
            (Some(t.b), "role_id_by_name".to_string()),
        ]
    );
    assert_eq!(report.failures, 2);
    assert_eq!(report.shared, 2);
}

#[tokio::test]
async fn test_failed_grant_keeps_the_association() {
    let app = helpers::TestApp::new().await;
    let (alice, t) = (app.people.alice, app.tree);
    app.faults
        .inject(
            "assign_role_to_shared_user",
            Some(t.b),
            None,
            Fault::Error(ErrorKind::NotFound),
        )
        .await;
    let mut events = app.service.subscribe();

    let request: GeneralShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [alice] },
        "policy": "IMMEDIATE_EXISTING_ORGS_ONLY",
        "roles": [editor()]
    }));
    app.service.share_general(&app.ctx, Some(request)).unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert_eq!(app.shared_orgs(alice).await, helpers::sorted(vec![t.a, t.b]));
    assert_eq!(
        failures(&seen),
        vec![(Some(t.b), "assign_role_to_shared_user".to_string())]
    );
    assert_eq!(report.shared, 2);
    assert_eq!(report.roles_granted, 1);
}

#[tokio::test]
async fn test_hierarchy_failure_is_contained() {
    let app = helpers::TestApp::new().await;
    let (alice, t) = (app.people.alice, app.tree);
    app.faults
        .inject(
            "child_organization_ids",
            Some(t.a),
            None,
            Fault::Error(ErrorKind::NotFound),
        )
        .await;
    let mut events = app.service.subscribe();

    let request: SelectiveShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [alice] },
        "organizations": [
            { "orgId": t.a, "policy": "SELECTED_ORG_WITH_ALL_EXISTING_CHILDREN_ONLY", "roles": [] },
            { "orgId": t.b, "policy": "SELECTED_ORG_ONLY", "roles": [] }
        ]
    }));
    app.service.share_selective(&app.ctx, Some(request)).unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert_eq!(app.shared_orgs(alice).await, vec![t.b]);
    assert_eq!(
        failures(&seen),
        vec![(Some(t.a), "child_organization_ids".to_string())]
    );
    assert_eq!(report.failures, 1);
    assert_eq!(report.shared, 1);
}

#[tokio::test]
async fn test_unresolvable_root_tenant_fails_every_user() {
    let app = helpers::TestApp::new().await;
    let p = app.people;
    app.faults
        .inject(
            "resolve_tenant_domain",
            None,
            None,
            Fault::Error(ErrorKind::NotFound),
        )
        .await;
    let mut events = app.service.subscribe();

    app.service
        .share_general(&app.ctx, Some(share_everywhere(&[p.alice, p.bob], json!([]))))
        .unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert!(app.associations.calls().await.is_empty());
    assert!(app.users.calls().await.is_empty());
    assert_eq!(
        failures(&seen),
        vec![
            (None, "resolve_tenant_domain".to_string()),
            (None, "resolve_tenant_domain".to_string()),
        ]
    );
    assert_eq!(report.failures, 2);
    assert_eq!(app.service.stats().completed, 1);
}

#[tokio::test]
async fn test_failed_unshare_unit_is_isolated() {
    let app = helpers::TestApp::new().await;
    let (alice, t) = (app.people.alice, app.tree);
    app.seed_association(alice, t.a).await;
    app.seed_association(alice, t.b).await;
    app.faults
        .inject(
            "remove_association",
            Some(t.a),
            None,
            Fault::Error(ErrorKind::Internal),
        )
        .await;
    let mut events = app.service.subscribe();

    let request = helpers::request(json!({
        "userCriteria": { "userIds": [alice] },
        "organizations": [t.a, t.b]
    }));
    app.service.unshare_selective(&app.ctx, Some(request)).unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert_eq!(app.shared_orgs(alice).await, vec![t.a]);
    assert_eq!(
        failures(&seen),
        vec![(Some(t.a), "remove_association".to_string())]
    );
    assert_eq!(report.removed, 1);
}

async fn share_with_slow_creates(max_concurrent_units: usize) -> Duration {
    let config = orgshare_core::config::PropagationConfig {
        max_concurrent_units,
        ..helpers::test_config()
    };
    let app = helpers::TestApp::with_config(config).await;
    app.faults
        .inject(
            "create_association",
            None,
            None,
            Fault::Delay(Duration::from_millis(50)),
        )
        .await;

    let started = Instant::now();
    app.service
        .share_general(&app.ctx, Some(share_everywhere(&[app.people.alice], json!([]))))
        .unwrap();
    app.settle().await;
    assert_eq!(app.shared_orgs(app.people.alice).await.len(), 5);
    started.elapsed()
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_bound_serializes_units() {
    let serial = share_with_slow_creates(1).await;
    assert!(serial >= Duration::from_millis(5 * 50), "took {serial:?}");

    let parallel = share_with_slow_creates(5).await;
    assert!(parallel < Duration::from_millis(5 * 50), "took {parallel:?}");
}
