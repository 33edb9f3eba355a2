//! Policy expansion into concrete target organizations.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;
use orgshare_core::traits::OrganizationHierarchy;
use orgshare_core::types::OrganizationId;
use orgshare_entity::SharingPolicy;

/// Expands a policy into the ordered set of organizations it reaches.
///
/// The hierarchy is consulted on every call; nothing is cached, so a tree
/// that changes between instructions is always seen fresh.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    hierarchy: Arc<dyn OrganizationHierarchy>,
}

impl PolicyResolver {
    /// Creates a resolver over `hierarchy`.
    pub fn new(hierarchy: Arc<dyn OrganizationHierarchy>) -> Self {
        Self { hierarchy }
    }

    /// Organizations `policy` reaches from `root`, or from `declared` for
    /// the policies that start at a declared organization.
    ///
    /// The result keeps first-seen order and holds no duplicates.
    pub async fn resolve(
        &self,
        root: OrganizationId,
        declared: Option<OrganizationId>,
        policy: SharingPolicy,
    ) -> AppResult<Vec<OrganizationId>> {
        let declared_or_err = || {
            declared.ok_or_else(|| {
                AppError::validation(format!("policy {policy} requires a declared organization"))
            })
        };

        let targets = match policy {
            SharingPolicy::NoSharing => Vec::new(),
            SharingPolicy::SelectedOrgOnly => vec![declared_or_err()?],
            SharingPolicy::SelectedOrgWithExistingImmediateChildrenOnly => {
                let declared = declared_or_err()?;
                let mut targets = vec![declared];
                targets.extend(self.hierarchy.child_organization_ids(declared, false).await?);
                targets
            }
            SharingPolicy::SelectedOrgWithAllExistingChildrenOnly => {
                let declared = declared_or_err()?;
                let mut targets = vec![declared];
                targets.extend(self.hierarchy.child_organization_ids(declared, true).await?);
                targets
            }
            SharingPolicy::ImmediateExistingOrgsOnly => {
                self.hierarchy.child_organization_ids(root, false).await?
            }
            SharingPolicy::AllExistingOrgsOnly => {
                self.hierarchy.child_organization_ids(root, true).await?
            }
        };

        let targets = unique_in_order(targets);
        debug!(
            root = %root,
            policy = %policy,
            count = targets.len(),
            "Resolved sharing policy"
        );
        Ok(targets)
    }
}

fn unique_in_order(ids: Vec<OrganizationId>) -> Vec<OrganizationId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
