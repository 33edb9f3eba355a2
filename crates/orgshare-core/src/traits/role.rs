//! Role management access.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{OrganizationId, RoleAudience, RoleId, UserId};

/// Role lookup and assignment.
#[async_trait]
pub trait RoleManager: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a role by name and audience inside `organization_id`.
    ///
    /// Fails with `NotFound` when no such role exists.
    async fn role_id_by_name(
        &self,
        role_name: &str,
        audience: &RoleAudience,
        organization_id: OrganizationId,
        tenant_domain: &str,
    ) -> AppResult<RoleId>;

    /// Grant the role `role_id` (as resolved in the root organization) to
    /// the shared user `shared_user_id` inside `organization_id`.
    ///
    /// Implementations map the root role onto its shared counterpart in the
    /// target organization.
    async fn assign_role_to_shared_user(
        &self,
        role_id: RoleId,
        shared_user_id: UserId,
        organization_id: OrganizationId,
        tenant_domain: &str,
    ) -> AppResult<()>;
}
