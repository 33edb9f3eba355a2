//! User-sharing domain events.

use serde::{Deserialize, Serialize};

use crate::types::{InstructionId, OrganizationId, RoleId, UserId};

/// Which entry point accepted an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    /// Per-organization share with individual policies.
    SelectiveShare,
    /// One policy applied across the hierarchy.
    GeneralShare,
    /// Removal from an explicit organization list.
    SelectiveUnshare,
    /// Removal from every organization rooted at the caller.
    GeneralUnshare,
}

impl std::fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelectiveShare => write!(f, "selective_share"),
            Self::GeneralShare => write!(f, "general_share"),
            Self::SelectiveUnshare => write!(f, "selective_unshare"),
            Self::GeneralUnshare => write!(f, "general_unshare"),
        }
    }
}

/// Why a user was left out of a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The user does not exist in the root tenant's user store.
    Absent,
    /// The user is itself a shared identity managed elsewhere.
    NonResident,
}

/// Tally of what one instruction did once its background work settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionReport {
    /// Users named by the instruction.
    pub users: usize,
    /// Users skipped because they were absent.
    pub skipped_absent: usize,
    /// Users skipped because they were not resident.
    pub skipped_non_resident: usize,
    /// Users routed to the update path.
    pub updated: usize,
    /// Associations created.
    pub shared: usize,
    /// Role grants recorded.
    pub roles_granted: usize,
    /// Associations removed.
    pub removed: u64,
    /// Units (or role grants) that failed.
    pub failures: usize,
}

impl InstructionReport {
    /// Fold another partial report into this one.
    pub fn absorb(&mut self, other: &InstructionReport) {
        self.users += other.users;
        self.skipped_absent += other.skipped_absent;
        self.skipped_non_resident += other.skipped_non_resident;
        self.updated += other.updated;
        self.shared += other.shared;
        self.roles_granted += other.roles_granted;
        self.removed += other.removed;
        self.failures += other.failures;
    }
}

/// Events related to share and unshare propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SharingEvent {
    /// An instruction passed validation and was scheduled.
    Accepted {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// Entry point that accepted it.
        kind: InstructionKind,
        /// Number of users named.
        user_count: usize,
    },
    /// A user was left out of a share.
    UserSkipped {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The skipped user.
        user_id: UserId,
        /// Why.
        reason: SkipReason,
    },
    /// A user already shared from the root took the update path.
    UpdatePathTaken {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The user.
        user_id: UserId,
    },
    /// A user was shared into an organization.
    UserShared {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The resident user.
        user_id: UserId,
        /// The target organization.
        organization_id: OrganizationId,
        /// The shared user's identity in the target organization.
        shared_user_id: UserId,
    },
    /// A role was granted to a shared user.
    RoleGranted {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The resident user.
        user_id: UserId,
        /// The target organization.
        organization_id: OrganizationId,
        /// The root role that was granted.
        role_id: RoleId,
    },
    /// A user's association in one organization was removed.
    UserUnshared {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The resident user.
        user_id: UserId,
        /// The organization the association was removed from.
        organization_id: OrganizationId,
    },
    /// All of a user's associations under the root were removed.
    AllUnshared {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The resident user.
        user_id: UserId,
        /// Number of associations removed.
        removed: u64,
    },
    /// One unit of work failed after its retries.
    UnitFailed {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// The resident user.
        user_id: UserId,
        /// The organization, when the failure is tied to one.
        organization_id: Option<OrganizationId>,
        /// The operation that failed.
        operation: String,
        /// Error message.
        error: String,
    },
    /// Every unit of an instruction has settled.
    Completed {
        /// Correlation ID of the instruction.
        instruction_id: InstructionId,
        /// Entry point that accepted it.
        kind: InstructionKind,
        /// What happened.
        report: InstructionReport,
    },
}

impl SharingEvent {
    /// Correlation ID of the instruction this event belongs to.
    pub fn instruction_id(&self) -> InstructionId {
        match self {
            Self::Accepted { instruction_id, .. }
            | Self::UserSkipped { instruction_id, .. }
            | Self::UpdatePathTaken { instruction_id, .. }
            | Self::UserShared { instruction_id, .. }
            | Self::RoleGranted { instruction_id, .. }
            | Self::UserUnshared { instruction_id, .. }
            | Self::AllUnshared { instruction_id, .. }
            | Self::UnitFailed { instruction_id, .. }
            | Self::Completed { instruction_id, .. } => *instruction_id,
        }
    }
}
