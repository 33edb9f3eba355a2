//! Organization hierarchy read access.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::OrganizationId;

/// Read-only view of the organization tree.
///
/// Implementations always answer from current state; callers must not
/// assume two calls observe the same tree.
#[async_trait]
pub trait OrganizationHierarchy: Send + Sync + std::fmt::Debug + 'static {
    /// Child organization IDs of `organization_id`.
    ///
    /// With `recursive` set, returns every descendant (breadth-first),
    /// otherwise only the immediate children. The organization itself is
    /// never included.
    async fn child_organization_ids(
        &self,
        organization_id: OrganizationId,
        recursive: bool,
    ) -> AppResult<Vec<OrganizationId>>;

    /// Tenant domain that owns `organization_id`.
    async fn resolve_tenant_domain(&self, organization_id: OrganizationId) -> AppResult<String>;
}
