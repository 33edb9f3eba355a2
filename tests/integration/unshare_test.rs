//! Integration tests for unshare propagation.

mod helpers;

use serde_json::json;

use orgshare_core::events::{InstructionKind, SharingEvent};
use orgshare_core::traits::AssociationStore;
use orgshare_core::types::{OrganizationId, SharedType, UserId};
use orgshare_entity::{GeneralShareRequest, GeneralUnshareRequest, SelectiveUnshareRequest};
use orgshare_memory::AssociationCall;

fn selective(users: &[UserId], organizations: &[OrganizationId]) -> SelectiveUnshareRequest {
    helpers::request(json!({
        "userCriteria": { "userIds": users },
        "organizations": organizations
    }))
}

fn general(users: &[UserId]) -> GeneralUnshareRequest {
    helpers::request(json!({ "userCriteria": { "userIds": users } }))
}

#[tokio::test]
async fn test_selective_unshare_removes_named_organizations() {
    let app = helpers::TestApp::new().await;
    let (p, t) = (app.people, app.tree);
    for org in [t.a, t.a1, t.b] {
        app.seed_association(p.alice, org).await;
    }
    let mut events = app.service.subscribe();

    app.service
        .unshare_selective(&app.ctx, Some(selective(&[p.alice, p.bob], &[t.a, t.a1, t.a])))
        .unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    let removes: Vec<_> = app
        .associations
        .calls()
        .await
        .into_iter()
        .filter(|call| matches!(call, AssociationCall::Remove { .. }))
        .collect();
    assert_eq!(removes.len(), 4);
    for user_id in [p.alice, p.bob] {
        for organization_id in [t.a, t.a1] {
            assert!(removes.contains(&AssociationCall::Remove {
                user_id,
                organization_id
            }));
        }
    }

    // Unsharing needs no eligibility checks.
    assert!(app.users.calls().await.is_empty());
    assert!(app.hierarchy.calls().await.is_empty());

    assert_eq!(app.shared_orgs(p.alice).await, vec![t.b]);
    assert_eq!(report.removed, 2);
    assert_eq!(report.failures, 0);

    let unshared: Vec<_> = seen
        .iter()
        .filter_map(|event| match event {
            SharingEvent::UserUnshared {
                user_id,
                organization_id,
                ..
            } => Some((*user_id, *organization_id)),
            _ => None,
        })
        .collect();
    assert_eq!(unshared.len(), 2);
    assert!(unshared.contains(&(p.alice, t.a)));
    assert!(unshared.contains(&(p.alice, t.a1)));
    assert_eq!(app.service.stats().associations_removed, 2);
}

#[tokio::test]
async fn test_general_unshare_keeps_other_roots() {
    let app = helpers::TestApp::new().await;
    let (alice, t) = (app.people.alice, app.tree);
    app.seed_association(alice, t.a).await;
    app.seed_association(alice, t.a2).await;

    let other_root = OrganizationId::new();
    let foreign_target = OrganizationId::new();
    app.associations
        .create_association(foreign_target, alice, other_root, SharedType::Shared)
        .await
        .unwrap();
    app.associations.reset_calls().await;
    let mut events = app.service.subscribe();

    app.service
        .unshare_general(&app.ctx, Some(general(&[alice])))
        .unwrap();
    let (report, seen) = helpers::completed(&mut events).await;
    app.settle().await;

    assert_eq!(
        app.associations.calls().await,
        vec![AssociationCall::RemoveAll {
            user_id: alice,
            root_organization_id: t.root,
        }]
    );

    let remaining = app.associations_of(alice).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].organization_id, foreign_target);
    assert_eq!(remaining[0].user_resident_organization_id, other_root);

    assert!(seen.iter().any(|event| matches!(
        event,
        SharingEvent::AllUnshared { user_id, removed: 2, .. } if *user_id == alice
    )));
    assert_eq!(report.removed, 2);
}

#[tokio::test]
async fn test_unsharing_a_never_shared_user_is_a_no_op() {
    let app = helpers::TestApp::new().await;
    let bob = app.people.bob;
    let mut events = app.service.subscribe();

    app.service
        .unshare_selective(&app.ctx, Some(selective(&[bob], &[app.tree.a])))
        .unwrap();
    let (selective_report, seen) = helpers::completed(&mut events).await;
    assert_eq!(selective_report.removed, 0);
    assert!(
        !seen
            .iter()
            .any(|event| matches!(event, SharingEvent::UserUnshared { .. }))
    );

    app.service
        .unshare_general(&app.ctx, Some(general(&[bob])))
        .unwrap();
    let (general_report, _) = helpers::completed(&mut events).await;
    assert_eq!(general_report.removed, 0);
    app.settle().await;

    let stats = app.service.stats();
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.associations_removed, 0);
    assert_eq!(stats.unit_failures, 0);
}

#[tokio::test]
async fn test_share_then_unshare_round_trip() {
    let app = helpers::TestApp::new().await;
    let alice = app.people.alice;
    let mut events = app.service.subscribe();

    let share: GeneralShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [alice] },
        "policy": "ALL_EXISTING_ORGS_ONLY",
        "roles": [{ "roleName": "editor", "audienceName": "Root", "audienceType": "organization" }]
    }));
    app.service.share_general(&app.ctx, Some(share.clone())).unwrap();
    app.settle().await;
    assert_eq!(app.shared_orgs(alice).await.len(), 5);

    app.service
        .unshare_general(&app.ctx, Some(general(&[alice])))
        .unwrap();
    app.settle().await;
    assert!(app.associations_of(alice).await.is_empty());

    // With nothing left under the root, sharing again creates afresh
    // instead of taking the update path.
    app.service.share_general(&app.ctx, Some(share)).unwrap();
    app.settle().await;
    assert_eq!(app.shared_orgs(alice).await.len(), 5);

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event.as_sharing() {
            Some(SharingEvent::Completed { kind, .. }) => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            InstructionKind::GeneralShare,
            InstructionKind::GeneralUnshare,
            InstructionKind::GeneralShare,
        ]
    );

    let stats = app.service.stats();
    assert_eq!(stats.update_path, 0);
    assert_eq!(stats.associations_created, 10);
    assert_eq!(stats.associations_removed, 5);
}
