//! Role audience descriptor.

use serde::{Deserialize, Serialize};

/// The audience a role is scoped to inside the root organization.
///
/// `audience_type` is typically `"application"` or `"organization"`; the
/// role manager decides how `name` is resolved for each type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAudience {
    /// Display name of the application or organization.
    pub name: String,
    /// Audience type tag.
    pub audience_type: String,
}

impl RoleAudience {
    /// Audience type for roles scoped to an organization.
    pub const ORGANIZATION: &'static str = "organization";
    /// Audience type for roles scoped to an application.
    pub const APPLICATION: &'static str = "application";

    /// Creates a new audience descriptor.
    pub fn new(name: impl Into<String>, audience_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            audience_type: audience_type.into(),
        }
    }

    /// Whether the role is scoped to an organization audience.
    pub fn is_organization(&self) -> bool {
        self.audience_type.eq_ignore_ascii_case(Self::ORGANIZATION)
    }
}
