//! Per-user eligibility for a share.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use orgshare_core::result::AppResult;
use orgshare_core::traits::{AssociationStore, UserStore};
use orgshare_core::types::{OrganizationId, TenantId, UserId};

/// Claim naming the organization that manages a shared identity. Resident
/// users never carry it.
pub const CLAIM_MANAGED_ORGANIZATION: &str = "http://wso2.org/claims/identity/managedOrg";

/// What to do with one user of a share instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Share into every resolved target.
    Proceed,
    /// The user is a shared identity managed by another organization.
    SkipNonResident,
    /// The user does not exist in the root tenant.
    SkipAbsent,
    /// The user was already shared from this root.
    UpdateExisting,
}

/// Decides [`Eligibility`] against the user store and association store.
#[derive(Debug, Clone)]
pub struct EligibilityChecker {
    users: Arc<dyn UserStore>,
    associations: Arc<dyn AssociationStore>,
}

impl EligibilityChecker {
    /// Creates a checker.
    pub fn new(users: Arc<dyn UserStore>, associations: Arc<dyn AssociationStore>) -> Self {
        Self {
            users,
            associations,
        }
    }

    /// Classify `user_id` for a share rooted at `root`, whose user store
    /// belongs to `tenant_id`.
    pub async fn check(
        &self,
        user_id: UserId,
        root: OrganizationId,
        tenant_id: TenantId,
    ) -> AppResult<Eligibility> {
        if !self.users.user_exists(tenant_id, user_id).await? {
            debug!(user_id = %user_id, tenant_id = %tenant_id, "User not found in root tenant");
            return Ok(Eligibility::SkipAbsent);
        }

        let claims = self
            .users
            .user_claims(tenant_id, user_id, &[CLAIM_MANAGED_ORGANIZATION])
            .await?;
        if claims
            .get(CLAIM_MANAGED_ORGANIZATION)
            .is_some_and(|org| !org.trim().is_empty())
        {
            debug!(user_id = %user_id, "User is managed by another organization");
            return Ok(Eligibility::SkipNonResident);
        }

        if self.associations.has_associations(user_id, root).await? {
            return Ok(Eligibility::UpdateExisting);
        }

        Ok(Eligibility::Proceed)
    }
}
