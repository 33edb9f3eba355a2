//! Validated share instructions.

use serde::{Deserialize, Serialize};

use orgshare_core::events::InstructionKind;
use orgshare_core::types::{OrganizationId, UserId};

use crate::policy::SharingPolicy;
use crate::role::RoleWithAudience;

/// A declared organization with its own policy and roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationShare {
    /// The declared organization.
    pub organization_id: OrganizationId,
    /// Expansion policy below the declared organization.
    pub policy: SharingPolicy,
    /// Roles to grant in each resulting organization.
    pub roles: Vec<RoleWithAudience>,
}

/// A validated selective share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectiveShare {
    /// Users to share, in request order without duplicates.
    pub user_ids: Vec<UserId>,
    /// Declared organizations.
    pub organizations: Vec<OrganizationShare>,
}

/// A validated general share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralShare {
    /// Users to share, in request order without duplicates.
    pub user_ids: Vec<UserId>,
    /// Root-scoped policy.
    pub policy: SharingPolicy,
    /// Roles to grant in each resulting organization.
    pub roles: Vec<RoleWithAudience>,
}

/// Either kind of validated share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShareInstruction {
    /// Per-organization share.
    Selective(SelectiveShare),
    /// Hierarchy-wide share.
    General(GeneralShare),
}

impl ShareInstruction {
    /// Users named by the instruction.
    pub fn user_ids(&self) -> &[UserId] {
        match self {
            Self::Selective(share) => &share.user_ids,
            Self::General(share) => &share.user_ids,
        }
    }

    /// The entry point this instruction belongs to.
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::Selective(_) => InstructionKind::SelectiveShare,
            Self::General(_) => InstructionKind::GeneralShare,
        }
    }
}
