//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use orgshare_core::config::PropagationConfig;
use orgshare_core::events::{DomainEvent, InstructionReport, SharingEvent};
use orgshare_core::types::{
    OrganizationId, RoleAudience, RoleId, SharedType, TenantId, UserAssociation, UserId,
};
use orgshare_memory::{
    FaultInjector, MemoryAssociationStore, MemoryHierarchy, MemoryRoleManager, MemoryUserStore,
};
use orgshare_service::sharing::CLAIM_MANAGED_ORGANIZATION;
use orgshare_service::{Collaborators, ExecutionContext, UserSharingService};

pub const TENANT_DOMAIN: &str = "carbon.super";
pub const TENANT_ID: TenantId = TenantId(-1234);

/// How long a test waits for background propagation.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(3);

/// Organization tree used by every test:
///
/// ```text
/// root
/// ├── a
/// │   ├── a1
/// │   │   └── a1x
/// │   └── a2
/// └── b
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tree {
    pub root: OrganizationId,
    pub a: OrganizationId,
    pub a1: OrganizationId,
    pub a1x: OrganizationId,
    pub a2: OrganizationId,
    pub b: OrganizationId,
}

/// Users seeded into the root tenant, plus one that is not.
#[derive(Debug, Clone, Copy)]
pub struct Users {
    /// Resident.
    pub alice: UserId,
    /// Resident.
    pub bob: UserId,
    /// Carries the managed-organization claim.
    pub carol: UserId,
    /// Not in the user store.
    pub dave: UserId,
}

/// Roles available in the root organization.
#[derive(Debug, Clone, Copy)]
pub struct Roles {
    /// Organization audience "Root".
    pub editor: RoleId,
    /// Application audience "Console".
    pub viewer: RoleId,
}

/// Test application context
pub struct TestApp {
    pub service: UserSharingService,
    pub ctx: ExecutionContext,
    pub hierarchy: Arc<MemoryHierarchy>,
    pub users: Arc<MemoryUserStore>,
    pub associations: Arc<MemoryAssociationStore>,
    pub roles: Arc<MemoryRoleManager>,
    pub faults: Arc<FaultInjector>,
    pub tree: Tree,
    pub people: Users,
    pub role_ids: Roles,
}

/// Propagation settings tuned for fast tests.
pub fn test_config() -> PropagationConfig {
    PropagationConfig {
        max_concurrent_units: 4,
        max_attempts: 3,
        initial_backoff_ms: 5,
        max_backoff_ms: 20,
        operation_timeout_ms: 200,
        event_buffer: 1024,
    }
}

impl TestApp {
    /// Create a new test application with [`test_config`].
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a new test application with explicit propagation settings.
    pub async fn with_config(config: PropagationConfig) -> Self {
        let tree = Tree {
            root: OrganizationId::new(),
            a: OrganizationId::new(),
            a1: OrganizationId::new(),
            a1x: OrganizationId::new(),
            a2: OrganizationId::new(),
            b: OrganizationId::new(),
        };
        let people = Users {
            alice: UserId::new(),
            bob: UserId::new(),
            carol: UserId::new(),
            dave: UserId::new(),
        };
        let role_ids = Roles {
            editor: RoleId::new(),
            viewer: RoleId::new(),
        };
        let faults = Arc::new(FaultInjector::new());

        let hierarchy = Arc::new(
            MemoryHierarchy::new()
                .with_faults(faults.clone())
                .with_organization(tree.root, "Root", None, TENANT_DOMAIN)
                .with_organization(tree.a, "A", Some(tree.root), TENANT_DOMAIN)
                .with_organization(tree.a1, "A1", Some(tree.a), TENANT_DOMAIN)
                .with_organization(tree.a1x, "A1x", Some(tree.a1), TENANT_DOMAIN)
                .with_organization(tree.a2, "A2", Some(tree.a), TENANT_DOMAIN)
                .with_organization(tree.b, "B", Some(tree.root), TENANT_DOMAIN),
        );

        let managed = HashMap::from([(CLAIM_MANAGED_ORGANIZATION.to_string(), tree.a.to_string())]);
        let users = Arc::new(
            MemoryUserStore::new()
                .with_faults(faults.clone())
                .with_tenant(TENANT_DOMAIN, TENANT_ID)
                .with_user(TENANT_ID, people.alice)
                .with_user(TENANT_ID, people.bob)
                .with_user_claims(TENANT_ID, people.carol, managed),
        );

        let roles = Arc::new(
            MemoryRoleManager::new()
                .with_faults(faults.clone())
                .with_role(
                    role_ids.editor,
                    "editor",
                    &RoleAudience::new("Root", RoleAudience::ORGANIZATION),
                    tree.root,
                )
                .with_role(
                    role_ids.viewer,
                    "viewer",
                    &RoleAudience::new("Console", RoleAudience::APPLICATION),
                    tree.root,
                ),
        );

        let associations = Arc::new(MemoryAssociationStore::new().with_faults(faults.clone()));

        let collaborators = Collaborators {
            hierarchy: hierarchy.clone(),
            users: users.clone(),
            associations: associations.clone(),
            roles: roles.clone(),
        };
        let service =
            UserSharingService::new(collaborators, &config).expect("Failed to build service");

        let ctx = ExecutionContext::new(
            UserId::new(),
            "admin",
            TENANT_ID,
            TENANT_DOMAIN,
            tree.root,
        );

        Self {
            service,
            ctx,
            hierarchy,
            users,
            associations,
            roles,
            faults,
            tree,
            people,
            role_ids,
        }
    }

    /// Wait for every accepted instruction to settle.
    pub async fn settle(&self) {
        tokio::time::timeout(SETTLE_TIMEOUT, self.service.drain())
            .await
            .expect("Propagation did not settle in time");
    }

    /// Total number of calls made to any collaborator.
    pub async fn collaborator_calls(&self) -> usize {
        self.hierarchy.calls().await.len()
            + self.users.calls().await.len()
            + self.associations.calls().await.len()
            + self.roles.calls().await.len()
    }

    /// Pre-existing association of `user` in `organization_id`, rooted at
    /// the root organization.
    pub async fn seed_association(&self, user_id: UserId, organization_id: OrganizationId) {
        use orgshare_core::traits::AssociationStore;

        self.associations
            .create_association(organization_id, user_id, self.tree.root, SharedType::Shared)
            .await
            .expect("Failed to seed association");
        self.associations.reset_calls().await;
    }

    /// Live associations of `user_id`, by organization.
    pub async fn associations_of(&self, user_id: UserId) -> Vec<UserAssociation> {
        self.associations
            .associations()
            .await
            .into_iter()
            .filter(|a| a.associated_user_id == user_id)
            .collect()
    }

    /// Organizations `user_id` is shared into, sorted.
    pub async fn shared_orgs(&self, user_id: UserId) -> Vec<OrganizationId> {
        let mut orgs: Vec<_> = self
            .associations_of(user_id)
            .await
            .into_iter()
            .map(|a| a.organization_id)
            .collect();
        orgs.sort();
        orgs
    }
}

/// Deserialize a JSON request body.
pub fn request<T: DeserializeOwned>(body: Value) -> T {
    serde_json::from_value(body).expect("Invalid request body")
}

/// Sorted copy of `ids`.
pub fn sorted(mut ids: Vec<OrganizationId>) -> Vec<OrganizationId> {
    ids.sort();
    ids
}

/// Wait for the next `Completed` event and return its report, collecting
/// every sharing event seen on the way.
pub async fn completed(
    events: &mut broadcast::Receiver<DomainEvent>,
) -> (InstructionReport, Vec<SharingEvent>) {
    let mut seen = Vec::new();
    loop {
        let event = tokio::time::timeout(SETTLE_TIMEOUT, events.recv())
            .await
            .expect("No completion event in time")
            .expect("Event channel closed");
        let Some(sharing) = event.as_sharing() else {
            continue;
        };
        if let SharingEvent::Completed { report, .. } = sharing {
            return (report.clone(), seen);
        }
        seen.push(sharing.clone());
    }
}
