//! Tenant-scoped user store access.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{TenantId, UserId};

/// Existence and claim lookups against a tenant's user store.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve the numeric tenant ID for a tenant domain.
    async fn tenant_id_for(&self, tenant_domain: &str) -> AppResult<TenantId>;

    /// Whether `user_id` exists in the tenant's user store.
    async fn user_exists(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<bool>;

    /// Read the requested claims of a user. Claims the user does not carry
    /// are absent from the returned map.
    async fn user_claims(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        claim_names: &[&str],
    ) -> AppResult<HashMap<String, String>>;
}
