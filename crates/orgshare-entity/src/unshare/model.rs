//! Validated unshare instructions.

use serde::{Deserialize, Serialize};

use orgshare_core::events::InstructionKind;
use orgshare_core::types::{OrganizationId, UserId};

/// Either kind of validated unshare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnshareInstruction {
    /// Remove from the listed organizations only.
    Selective {
        /// Users to unshare.
        user_ids: Vec<UserId>,
        /// Organizations to remove them from.
        organizations: Vec<OrganizationId>,
    },
    /// Remove from everything rooted at the caller's organization.
    General {
        /// Users to unshare.
        user_ids: Vec<UserId>,
    },
}

impl UnshareInstruction {
    /// Users named by the instruction.
    pub fn user_ids(&self) -> &[UserId] {
        match self {
            Self::Selective { user_ids, .. } | Self::General { user_ids } => user_ids,
        }
    }

    /// The entry point this instruction belongs to.
    pub fn kind(&self) -> InstructionKind {
        match self {
            Self::Selective { .. } => InstructionKind::SelectiveUnshare,
            Self::General { .. } => InstructionKind::GeneralUnshare,
        }
    }
}
