//! Distribution policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How broadly a share fans out across the organization hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharingPolicy {
    /// Share nowhere.
    NoSharing,
    /// Only the declared organization.
    SelectedOrgOnly,
    /// The declared organization and all of its existing descendants.
    SelectedOrgWithAllExistingChildrenOnly,
    /// The declared organization and its existing immediate children.
    SelectedOrgWithExistingImmediateChildrenOnly,
    /// Every existing descendant of the root.
    AllExistingOrgsOnly,
    /// The existing immediate children of the root.
    ImmediateExistingOrgsOnly,
}

impl SharingPolicy {
    /// All policies, in declaration order.
    pub const ALL: [SharingPolicy; 6] = [
        Self::NoSharing,
        Self::SelectedOrgOnly,
        Self::SelectedOrgWithAllExistingChildrenOnly,
        Self::SelectedOrgWithExistingImmediateChildrenOnly,
        Self::AllExistingOrgsOnly,
        Self::ImmediateExistingOrgsOnly,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSharing => "NO_SHARING",
            Self::SelectedOrgOnly => "SELECTED_ORG_ONLY",
            Self::SelectedOrgWithAllExistingChildrenOnly => {
                "SELECTED_ORG_WITH_ALL_EXISTING_CHILDREN_ONLY"
            }
            Self::SelectedOrgWithExistingImmediateChildrenOnly => {
                "SELECTED_ORG_WITH_EXISTING_IMMEDIATE_CHILDREN_ONLY"
            }
            Self::AllExistingOrgsOnly => "ALL_EXISTING_ORGS_ONLY",
            Self::ImmediateExistingOrgsOnly => "IMMEDIATE_EXISTING_ORGS_ONLY",
        }
    }

    /// Whether the policy expands from a declared organization rather than
    /// from the root.
    pub fn requires_declared_organization(&self) -> bool {
        matches!(
            self,
            Self::SelectedOrgOnly
                | Self::SelectedOrgWithAllExistingChildrenOnly
                | Self::SelectedOrgWithExistingImmediateChildrenOnly
        )
    }
}

impl fmt::Display for SharingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sharing policy: {s}"))
    }
}
