//! JSON fixture describing one world of tenants, organizations, users,
//! roles and associations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;
use orgshare_core::types::{
    OrganizationId, RoleAudience, RoleId, TenantId, UserAssociation, UserId,
};

use crate::{
    FaultInjector, MemoryAssociationStore, MemoryCollaborators, MemoryHierarchy,
    MemoryRoleManager, MemoryUserStore,
};

/// The administrator issuing instructions against a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCaller {
    /// Caller user id.
    pub user_id: UserId,
    /// Caller username.
    pub username: String,
    /// The caller's (root) organization.
    pub organization_id: OrganizationId,
}

/// A tenant domain and its numeric id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureTenant {
    /// Tenant domain.
    pub domain: String,
    /// Tenant id.
    pub id: TenantId,
}

/// One organization in the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureOrganization {
    /// Organization id.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Parent, absent for a root.
    #[serde(default)]
    pub parent_id: Option<OrganizationId>,
    /// Tenant domain owning the organization.
    pub tenant_domain: String,
}

/// A user registered in a tenant's user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureUser {
    /// User id.
    pub id: UserId,
    /// Tenant domain the user lives in.
    pub tenant_domain: String,
    /// Claim URI to value.
    #[serde(default)]
    pub claims: HashMap<String, String>,
}

/// A role available for grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRole {
    /// Role id.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Audience display name.
    pub audience_name: String,
    /// Audience type.
    pub audience_type: String,
    /// Organization owning the role.
    pub organization_id: OrganizationId,
}

/// Every collaborator's seed data in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Who issues instructions.
    pub caller: FixtureCaller,
    /// Tenant domains.
    #[serde(default)]
    pub tenants: Vec<FixtureTenant>,
    /// Organizations, parents listed before children.
    #[serde(default)]
    pub organizations: Vec<FixtureOrganization>,
    /// Users.
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    /// Roles.
    #[serde(default)]
    pub roles: Vec<FixtureRole>,
    /// Pre-existing associations.
    #[serde(default)]
    pub associations: Vec<UserAssociation>,
}

impl Fixture {
    /// Read and parse a fixture file.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                orgshare_core::error::ErrorKind::Io,
                format!("Failed to read fixture {}: {e}", path.display()),
                e,
            )
        })?;
        let fixture: Self = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            organizations = fixture.organizations.len(),
            users = fixture.users.len(),
            "Fixture loaded"
        );
        Ok(fixture)
    }

    /// Tenant id registered for `domain`.
    pub fn tenant_id(&self, domain: &str) -> AppResult<TenantId> {
        self.tenants
            .iter()
            .find(|t| t.domain == domain)
            .map(|t| t.id)
            .ok_or_else(|| AppError::not_found(format!("Tenant '{domain}' not in fixture")))
    }

    /// Build every collaborator, all sharing one fault injector.
    pub fn build(&self) -> AppResult<MemoryCollaborators> {
        let faults = Arc::new(FaultInjector::new());

        let mut hierarchy = MemoryHierarchy::new().with_faults(faults.clone());
        for org in &self.organizations {
            hierarchy = hierarchy.with_organization(
                org.id,
                org.name.clone(),
                org.parent_id,
                org.tenant_domain.clone(),
            );
        }

        let mut users = MemoryUserStore::new().with_faults(faults.clone());
        for tenant in &self.tenants {
            users = users.with_tenant(tenant.domain.clone(), tenant.id);
        }
        for user in &self.users {
            let tenant_id = self.tenant_id(&user.tenant_domain)?;
            users = users.with_user_claims(tenant_id, user.id, user.claims.clone());
        }

        let mut roles = MemoryRoleManager::new().with_faults(faults.clone());
        for role in &self.roles {
            roles = roles.with_role(
                role.id,
                &role.name,
                &RoleAudience::new(role.audience_name.clone(), role.audience_type.clone()),
                role.organization_id,
            );
        }

        let mut associations = MemoryAssociationStore::new().with_faults(faults);
        for association in &self.associations {
            associations = associations.with_association(association.clone());
        }

        Ok(MemoryCollaborators {
            hierarchy: Arc::new(hierarchy),
            users: Arc::new(users),
            associations: Arc::new(associations),
            roles: Arc::new(roles),
        })
    }
}
