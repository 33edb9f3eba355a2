//! Integration tests for instruction validation at the entry points.

mod helpers;

use std::time::Duration;

use serde_json::json;

use orgshare_core::error::ErrorKind;
use orgshare_entity::{
    GeneralShareRequest, GeneralUnshareRequest, SelectiveShareRequest, SelectiveUnshareRequest,
};
use orgshare_memory::Fault;

fn selective_bodies(app: &helpers::TestApp) -> Vec<serde_json::Value> {
    let alice = app.people.alice;
    let org = app.tree.a;
    let role = |name: serde_json::Value, audience: serde_json::Value, kind: serde_json::Value| {
        json!([{ "roleName": name, "audienceName": audience, "audienceType": kind }])
    };

    vec![
        json!({ "organizations": [] }),
        json!({ "userCriteria": null, "organizations": [] }),
        json!({ "userCriteria": { "wrongKey": [alice] }, "organizations": [] }),
        json!({ "userCriteria": { "userIds": null }, "organizations": [] }),
        json!({ "userCriteria": { "userIds": [alice] } }),
        json!({ "userCriteria": { "userIds": [alice] },
                "organizations": [{ "policy": "SELECTED_ORG_ONLY", "roles": [] }] }),
        json!({ "userCriteria": { "userIds": [alice] },
                "organizations": [{ "orgId": org, "roles": [] }] }),
        json!({ "userCriteria": { "userIds": [alice] },
                "organizations": [{ "orgId": org, "policy": "SELECTED_ORG_ONLY" }] }),
        json!({ "userCriteria": { "userIds": [alice] },
                "organizations": [{ "orgId": org, "policy": "SELECTED_ORG_ONLY",
                                    "roles": role(json!(null), json!("App1"), json!("application")) }] }),
        json!({ "userCriteria": { "userIds": [alice] },
                "organizations": [{ "orgId": org, "policy": "SELECTED_ORG_ONLY",
                                    "roles": role(json!("role1"), json!(null), json!("application")) }] }),
        json!({ "userCriteria": { "userIds": [alice] },
                "organizations": [{ "orgId": org, "policy": "SELECTED_ORG_ONLY",
                                    "roles": role(json!("role1"), json!("App1"), json!(null)) }] }),
    ]
}

#[tokio::test]
async fn test_selective_share_rejects_malformed_requests() {
    let app = helpers::TestApp::new().await;

    let err = app.service.share_selective(&app.ctx, None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let bodies = selective_bodies(&app);
    let count = bodies.len();
    for body in bodies {
        let request: SelectiveShareRequest = helpers::request(body.clone());
        let err = app
            .service
            .share_selective(&app.ctx, Some(request))
            .expect_err(&format!("accepted {body}"));
        assert!(err.is_validation(), "{body} gave {err}");
    }

    assert_eq!(app.service.stats().rejected, count as u64 + 1);
    assert_eq!(app.service.stats().accepted, 0);
    assert_eq!(app.service.executor().in_flight(), 0);
    assert_eq!(app.collaborator_calls().await, 0);
}

#[tokio::test]
async fn test_general_share_rejects_malformed_requests() {
    let app = helpers::TestApp::new().await;
    let alice = app.people.alice;

    assert!(app.service.share_general(&app.ctx, None).unwrap_err().is_validation());

    let bodies = [
        json!({ "policy": "ALL_EXISTING_ORGS_ONLY", "roles": [] }),
        json!({ "userCriteria": { "userIds": null }, "policy": "ALL_EXISTING_ORGS_ONLY", "roles": [] }),
        json!({ "userCriteria": { "userIds": [alice] }, "roles": [] }),
        json!({ "userCriteria": { "userIds": [alice] }, "policy": "ALL_EXISTING_ORGS_ONLY" }),
        json!({ "userCriteria": { "userIds": [alice] }, "policy": "ALL_EXISTING_ORGS_ONLY",
                "roles": [{ "roleName": "editor", "audienceName": "", "audienceType": "organization" }] }),
        json!({ "userCriteria": { "userIds": [alice] }, "policy": "SELECTED_ORG_ONLY", "roles": [] }),
    ];
    for body in bodies {
        let request: GeneralShareRequest = helpers::request(body.clone());
        let err = app
            .service
            .share_general(&app.ctx, Some(request))
            .expect_err(&format!("accepted {body}"));
        assert!(err.is_validation(), "{body} gave {err}");
    }

    assert_eq!(app.collaborator_calls().await, 0);
}

#[tokio::test]
async fn test_unshare_rejects_malformed_requests() {
    let app = helpers::TestApp::new().await;
    let alice = app.people.alice;

    assert!(app.service.unshare_selective(&app.ctx, None).unwrap_err().is_validation());
    assert!(app.service.unshare_general(&app.ctx, None).unwrap_err().is_validation());

    let selective = [
        json!({ "organizations": [app.tree.a] }),
        json!({ "userCriteria": { "userIds": [alice] } }),
        json!({ "userCriteria": { "userIds": [alice] }, "organizations": [app.tree.a, null] }),
        json!({ "userCriteria": { "other": [alice] }, "organizations": [app.tree.a] }),
    ];
    for body in selective {
        let request: SelectiveUnshareRequest = helpers::request(body.clone());
        assert!(
            app.service.unshare_selective(&app.ctx, Some(request)).is_err(),
            "accepted {body}"
        );
    }

    let general = [
        json!({}),
        json!({ "userCriteria": null }),
        json!({ "userCriteria": { "userIds": null } }),
        json!({ "userCriteria": { "userIds": [alice], "extra": [alice] } }),
    ];
    for body in general {
        let request: GeneralUnshareRequest = helpers::request(body.clone());
        assert!(
            app.service.unshare_general(&app.ctx, Some(request)).is_err(),
            "accepted {body}"
        );
    }

    assert_eq!(app.collaborator_calls().await, 0);
}

#[tokio::test]
async fn test_accepts_without_waiting_for_propagation() {
    let app = helpers::TestApp::new().await;
    app.faults
        .inject("user_exists", None, None, Fault::Delay(Duration::from_millis(100)))
        .await;

    let request: SelectiveShareRequest = helpers::request(json!({
        "userCriteria": { "userIds": [app.people.alice] },
        "organizations": [{ "orgId": app.tree.a, "policy": "SELECTED_ORG_ONLY", "roles": [] }]
    }));
    app.service.share_selective(&app.ctx, Some(request)).unwrap();

    assert_eq!(app.service.stats().accepted, 1);
    assert_eq!(app.service.executor().in_flight(), 1);
    assert!(app.associations.calls().await.is_empty());

    app.settle().await;
    assert_eq!(app.shared_orgs(app.people.alice).await, vec![app.tree.a]);
}

#[tokio::test]
async fn test_empty_user_list_is_rejected() {
    let app = helpers::TestApp::new().await;
    let empty = json!({ "userIds": [] });

    let selective_share: SelectiveShareRequest = helpers::request(json!({
        "userCriteria": empty,
        "organizations": [{ "orgId": app.tree.a, "policy": "SELECTED_ORG_ONLY", "roles": [] }]
    }));
    let general_share: GeneralShareRequest = helpers::request(json!({
        "userCriteria": empty,
        "policy": "ALL_EXISTING_ORGS_ONLY",
        "roles": []
    }));
    let selective_unshare: SelectiveUnshareRequest = helpers::request(json!({
        "userCriteria": empty,
        "organizations": [app.tree.a]
    }));
    let general_unshare: GeneralUnshareRequest =
        helpers::request(json!({ "userCriteria": empty }));

    let results = [
        app.service.share_selective(&app.ctx, Some(selective_share)),
        app.service.share_general(&app.ctx, Some(general_share)),
        app.service.unshare_selective(&app.ctx, Some(selective_unshare)),
        app.service.unshare_general(&app.ctx, Some(general_unshare)),
    ];
    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_validation(), "{err}");
        assert!(err.message.contains("must not be empty"), "{err}");
    }

    let stats = app.service.stats();
    assert_eq!(stats.rejected, 4);
    assert_eq!(stats.accepted, 0);
    assert_eq!(app.collaborator_calls().await, 0);
}
