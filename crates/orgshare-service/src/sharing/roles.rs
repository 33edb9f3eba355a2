//! Role resolution and grants for shared users.

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use orgshare_core::traits::RoleManager;
use orgshare_core::types::{OrganizationId, RoleId, UserId};
use orgshare_entity::RoleWithAudience;

use super::retry::{Retrier, UnitError};

/// Resolves role references in the root organization and records grants
/// against shared users.
#[derive(Debug, Clone)]
pub struct RoleGrantApplier {
    roles: Arc<dyn RoleManager>,
    retrier: Retrier,
}

impl RoleGrantApplier {
    /// Creates an applier.
    pub fn new(roles: Arc<dyn RoleManager>, retrier: Retrier) -> Self {
        Self { roles, retrier }
    }

    /// Resolve one reference to the role's ID in `root`.
    pub async fn resolve(
        &self,
        role: &RoleWithAudience,
        root: OrganizationId,
        root_tenant_domain: &str,
    ) -> Result<RoleId, UnitError> {
        let role_id = self
            .retrier
            .run("role_id_by_name", || {
                self.roles
                    .role_id_by_name(&role.role_name, &role.audience, root, root_tenant_domain)
            })
            .await?;
        debug!(role = %role, role_id = %role_id, "Resolved role reference");
        Ok(role_id)
    }

    /// Resolve every reference concurrently. Results keep the input order.
    pub async fn resolve_all(
        &self,
        roles: &[RoleWithAudience],
        root: OrganizationId,
        root_tenant_domain: &str,
    ) -> Vec<Result<RoleId, UnitError>> {
        join_all(
            roles
                .iter()
                .map(|role| self.resolve(role, root, root_tenant_domain)),
        )
        .await
    }

    /// Grant `role_id` to the shared user living in `organization_id`.
    pub async fn grant(
        &self,
        role_id: RoleId,
        shared_user_id: UserId,
        organization_id: OrganizationId,
        root_tenant_domain: &str,
    ) -> Result<(), UnitError> {
        self.retrier
            .run("assign_role_to_shared_user", || {
                self.roles.assign_role_to_shared_user(
                    role_id,
                    shared_user_id,
                    organization_id,
                    root_tenant_domain,
                )
            })
            .await
    }
}
