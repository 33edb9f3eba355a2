//! The association record exchanged with the association store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrganizationId, UserId};

/// How a user came to be present in an organization other than its home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharedType {
    /// Shared into the organization by a sharing instruction.
    Shared,
    /// The organization owner's own association.
    Owner,
    /// Joined through an invitation.
    Invited,
    /// Created before shared types were tracked.
    NotSpecified,
}

impl std::fmt::Display for SharedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared => write!(f, "SHARED"),
            Self::Owner => write!(f, "OWNER"),
            Self::Invited => write!(f, "INVITED"),
            Self::NotSpecified => write!(f, "NOT_SPECIFIED"),
        }
    }
}

/// A live association granting a resident user presence in a target
/// organization.
///
/// At most one association exists per (`associated_user_id`,
/// `organization_id`) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssociation {
    /// Identity of the shared user inside the target organization.
    pub user_id: UserId,
    /// The target organization the user was shared into.
    pub organization_id: OrganizationId,
    /// The resident user this association shares.
    pub associated_user_id: UserId,
    /// The organization the resident user lives in (the sharing root).
    pub user_resident_organization_id: OrganizationId,
    /// How the association came about.
    pub shared_type: SharedType,
    /// When the association was created.
    pub created_at: DateTime<Utc>,
}
