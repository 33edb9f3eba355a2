//! Unshare requests as handed over by the transport layer.

use serde::{Deserialize, Serialize};

use orgshare_core::types::OrganizationId;

use crate::criteria::UserCriteria;

/// Remove users from an explicit list of organizations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectiveUnshareRequest {
    /// Which users to unshare.
    pub user_criteria: Option<UserCriteria>,
    /// Organizations to remove the users from. `null` entries are rejected.
    pub organizations: Option<Vec<Option<OrganizationId>>>,
}

/// Remove users from every organization they were shared into from the
/// caller's organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralUnshareRequest {
    /// Which users to unshare.
    pub user_criteria: Option<UserCriteria>,
}
