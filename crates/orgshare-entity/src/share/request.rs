//! Share requests as handed over by the transport layer.

use serde::{Deserialize, Serialize};

use orgshare_core::types::OrganizationId;

use crate::criteria::UserCriteria;
use crate::policy::SharingPolicy;
use crate::role::RoleReferenceRequest;

/// Share users into individually declared organizations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectiveShareRequest {
    /// Which users to share.
    pub user_criteria: Option<UserCriteria>,
    /// One entry per declared organization.
    pub organizations: Option<Vec<OrganizationShareRequest>>,
}

/// One declared organization of a selective share.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationShareRequest {
    /// The declared organization.
    #[serde(rename = "orgId")]
    pub organization_id: Option<OrganizationId>,
    /// How far below the declared organization to fan out.
    pub policy: Option<SharingPolicy>,
    /// Roles to grant in every resulting organization. May be empty.
    pub roles: Option<Vec<RoleReferenceRequest>>,
}

/// Share users across the hierarchy with a single policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralShareRequest {
    /// Which users to share.
    pub user_criteria: Option<UserCriteria>,
    /// Policy applied from the root.
    pub policy: Option<SharingPolicy>,
    /// Roles to grant in every resulting organization. May be empty.
    pub roles: Option<Vec<RoleReferenceRequest>>,
}
