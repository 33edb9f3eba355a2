//! In-memory role manager.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;
use orgshare_core::traits::RoleManager;
use orgshare_core::types::{OrganizationId, RoleAudience, RoleId, UserId};

use crate::fault::FaultInjector;

/// A call observed by [`MemoryRoleManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCall {
    /// `role_id_by_name`.
    Resolve {
        /// Role name queried.
        role_name: String,
        /// Audience queried.
        audience: RoleAudience,
        /// Organization the role lives in.
        organization_id: OrganizationId,
        /// Tenant domain of that organization.
        tenant_domain: String,
    },
    /// `assign_role_to_shared_user`.
    Assign {
        /// Role granted.
        role_id: RoleId,
        /// Shared user receiving the role.
        shared_user_id: UserId,
        /// Target organization.
        organization_id: OrganizationId,
        /// Tenant domain passed along.
        tenant_domain: String,
    },
}

/// A role recorded against a shared user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrant {
    /// Role granted.
    pub role_id: RoleId,
    /// Shared user holding it.
    pub shared_user_id: UserId,
    /// Organization the grant applies in.
    pub organization_id: OrganizationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RoleKey {
    organization_id: OrganizationId,
    role_name: String,
    audience_type: String,
    audience_name: String,
}

impl RoleKey {
    fn new(role_name: &str, audience: &RoleAudience, organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            role_name: role_name.to_string(),
            audience_type: audience.audience_type.to_ascii_lowercase(),
            audience_name: audience.name.clone(),
        }
    }
}

/// Role catalogue plus the grants made against shared users.
#[derive(Debug, Default)]
pub struct MemoryRoleManager {
    roles: RwLock<HashMap<RoleKey, RoleId>>,
    grants: Mutex<Vec<RoleGrant>>,
    calls: Mutex<Vec<RoleCall>>,
    faults: Arc<FaultInjector>,
}

impl MemoryRoleManager {
    /// Creates an empty role manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a fault injector with other collaborators.
    pub fn with_faults(mut self, faults: Arc<FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    /// Register a role under `organization_id`. The audience type is
    /// matched case-insensitively.
    pub fn with_role(
        mut self,
        role_id: RoleId,
        role_name: &str,
        audience: &RoleAudience,
        organization_id: OrganizationId,
    ) -> Self {
        self.roles
            .get_mut()
            .insert(RoleKey::new(role_name, audience, organization_id), role_id);
        self
    }

    /// Every grant recorded so far.
    pub async fn grants(&self) -> Vec<RoleGrant> {
        self.grants.lock().await.clone()
    }

    /// Every call observed so far.
    pub async fn calls(&self) -> Vec<RoleCall> {
        self.calls.lock().await.clone()
    }

    /// Number of `role_id_by_name` calls made for `role_name`.
    pub async fn resolve_count(&self, role_name: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, RoleCall::Resolve { role_name: name, .. } if name == role_name))
            .count()
    }

    /// Forget recorded calls.
    pub async fn reset_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// The fault injector consulted by this manager.
    pub fn faults(&self) -> &Arc<FaultInjector> {
        &self.faults
    }
}

#[async_trait]
impl RoleManager for MemoryRoleManager {
    async fn role_id_by_name(
        &self,
        role_name: &str,
        audience: &RoleAudience,
        organization_id: OrganizationId,
        tenant_domain: &str,
    ) -> AppResult<RoleId> {
        self.calls.lock().await.push(RoleCall::Resolve {
            role_name: role_name.to_string(),
            audience: audience.clone(),
            organization_id,
            tenant_domain: tenant_domain.to_string(),
        });
        self.faults
            .check("role_id_by_name", Some(organization_id))
            .await?;

        self.roles
            .read()
            .await
            .get(&RoleKey::new(role_name, audience, organization_id))
            .copied()
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Role '{role_name}' for {} audience '{}' not found",
                    audience.audience_type, audience.name
                ))
            })
    }

    async fn assign_role_to_shared_user(
        &self,
        role_id: RoleId,
        shared_user_id: UserId,
        organization_id: OrganizationId,
        tenant_domain: &str,
    ) -> AppResult<()> {
        self.calls.lock().await.push(RoleCall::Assign {
            role_id,
            shared_user_id,
            organization_id,
            tenant_domain: tenant_domain.to_string(),
        });
        self.faults
            .check("assign_role_to_shared_user", Some(organization_id))
            .await?;

        let grant = RoleGrant {
            role_id,
            shared_user_id,
            organization_id,
        };
        let mut grants = self.grants.lock().await;
        if !grants.contains(&grant) {
            debug!(
                role_id = %role_id,
                shared_user_id = %shared_user_id,
                organization_id = %organization_id,
                "Role granted"
            );
            grants.push(grant);
        }
        Ok(())
    }
}
