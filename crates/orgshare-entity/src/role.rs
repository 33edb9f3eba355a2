//! Role references attached to share instructions.

use serde::{Deserialize, Serialize};

use orgshare_core::types::RoleAudience;

/// A role reference as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleReferenceRequest {
    /// Role name in the root organization.
    pub role_name: Option<String>,
    /// Display name of the role's audience.
    pub audience_name: Option<String>,
    /// Audience type (`application` or `organization`).
    pub audience_type: Option<String>,
}

impl RoleReferenceRequest {
    /// Creates a fully populated reference.
    pub fn new(
        role_name: impl Into<String>,
        audience_name: impl Into<String>,
        audience_type: impl Into<String>,
    ) -> Self {
        Self {
            role_name: Some(role_name.into()),
            audience_name: Some(audience_name.into()),
            audience_type: Some(audience_type.into()),
        }
    }
}

/// A validated role reference scoped to an audience in the root
/// organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithAudience {
    /// Role name.
    pub role_name: String,
    /// The audience the role belongs to.
    pub audience: RoleAudience,
}

impl std::fmt::Display for RoleWithAudience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.role_name, self.audience.audience_type, self.audience.name
        )
    }
}
