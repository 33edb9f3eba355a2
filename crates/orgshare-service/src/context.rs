//! Execution context carrying the caller and the root organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgshare_core::types::{OrganizationId, TenantId, UserId};

/// Who is issuing an instruction, and from which organization.
///
/// Built by the caller and passed into every entry point. The propagation
/// engine takes its own copy at validation time, so the background work
/// never reads from the caller afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The administrator's user ID.
    pub user_id: UserId,
    /// The administrator's username.
    pub username: String,
    /// Tenant of the caller.
    pub tenant_id: TenantId,
    /// Tenant domain of the caller.
    pub tenant_domain: String,
    /// The root organization instructions are issued from.
    pub organization_id: OrganizationId,
    /// When the context was created.
    pub request_time: DateTime<Utc>,
}

impl ExecutionContext {
    /// Creates a new execution context.
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        tenant_id: TenantId,
        tenant_domain: impl Into<String>,
        organization_id: OrganizationId,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            tenant_id,
            tenant_domain: tenant_domain.into(),
            organization_id,
            request_time: Utc::now(),
        }
    }
}
