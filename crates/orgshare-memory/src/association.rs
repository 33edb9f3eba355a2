//! In-memory association store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use orgshare_core::result::AppResult;
use orgshare_core::traits::AssociationStore;
use orgshare_core::types::{OrganizationId, SharedType, UserAssociation, UserId};

use crate::fault::FaultInjector;

/// A call observed by [`MemoryAssociationStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationCall {
    /// `has_associations`.
    HasAssociations {
        /// Resident user.
        user_id: UserId,
        /// Resident organization.
        resident_organization_id: OrganizationId,
    },
    /// `association_in_organization`.
    Lookup {
        /// Resident user.
        user_id: UserId,
        /// Organization queried.
        organization_id: OrganizationId,
    },
    /// `create_association`.
    Create {
        /// Target organization.
        target_organization_id: OrganizationId,
        /// Resident user.
        user_id: UserId,
        /// Root organization.
        root_organization_id: OrganizationId,
        /// Shared type requested.
        shared_type: SharedType,
    },
    /// `remove_association`.
    Remove {
        /// Resident user.
        user_id: UserId,
        /// Organization.
        organization_id: OrganizationId,
    },
    /// `remove_all_associations`.
    RemoveAll {
        /// Resident user.
        user_id: UserId,
        /// Root organization.
        root_organization_id: OrganizationId,
    },
}

/// Association store keeping at most one association per
/// (resident user, organization).
#[derive(Debug, Default)]
pub struct MemoryAssociationStore {
    associations: Mutex<Vec<UserAssociation>>,
    calls: Mutex<Vec<AssociationCall>>,
    faults: Arc<FaultInjector>,
}

impl MemoryAssociationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a fault injector with other collaborators.
    pub fn with_faults(mut self, faults: Arc<FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    /// Pre-populate an association.
    pub fn with_association(mut self, association: UserAssociation) -> Self {
        self.associations.get_mut().push(association);
        self
    }

    /// Snapshot of every live association.
    pub async fn associations(&self) -> Vec<UserAssociation> {
        self.associations.lock().await.clone()
    }

    /// Every call observed so far.
    pub async fn calls(&self) -> Vec<AssociationCall> {
        self.calls.lock().await.clone()
    }

    /// Target organizations of every `create_association` call, in call
    /// order.
    pub async fn created_in(&self) -> Vec<OrganizationId> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                AssociationCall::Create {
                    target_organization_id,
                    ..
                } => Some(*target_organization_id),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls.
    pub async fn reset_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// The fault injector consulted by this store.
    pub fn faults(&self) -> &Arc<FaultInjector> {
        &self.faults
    }
}

#[async_trait]
impl AssociationStore for MemoryAssociationStore {
    async fn has_associations(
        &self,
        user_id: UserId,
        resident_organization_id: OrganizationId,
    ) -> AppResult<bool> {
        self.calls.lock().await.push(AssociationCall::HasAssociations {
            user_id,
            resident_organization_id,
        });
        self.faults
            .check("has_associations", Some(resident_organization_id))
            .await?;

        Ok(self.associations.lock().await.iter().any(|a| {
            a.associated_user_id == user_id
                && a.user_resident_organization_id == resident_organization_id
        }))
    }

    async fn association_in_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> AppResult<Option<UserAssociation>> {
        self.calls.lock().await.push(AssociationCall::Lookup {
            user_id,
            organization_id,
        });
        self.faults
            .check("association_in_organization", Some(organization_id))
            .await?;

        Ok(self
            .associations
            .lock()
            .await
            .iter()
            .find(|a| a.associated_user_id == user_id && a.organization_id == organization_id)
            .cloned())
    }

    async fn create_association(
        &self,
        target_organization_id: OrganizationId,
        user_id: UserId,
        root_organization_id: OrganizationId,
        shared_type: SharedType,
    ) -> AppResult<()> {
        self.calls.lock().await.push(AssociationCall::Create {
            target_organization_id,
            user_id,
            root_organization_id,
            shared_type,
        });
        self.faults
            .check("create_association", Some(target_organization_id))
            .await?;

        let mut associations = self.associations.lock().await;
        if associations
            .iter()
            .any(|a| a.associated_user_id == user_id && a.organization_id == target_organization_id)
        {
            debug!(
                user_id = %user_id,
                organization_id = %target_organization_id,
                "Association already exists, keeping the live one"
            );
            return Ok(());
        }

        let association = UserAssociation {
            user_id: UserId::new(),
            organization_id: target_organization_id,
            associated_user_id: user_id,
            user_resident_organization_id: root_organization_id,
            shared_type,
            created_at: Utc::now(),
        };
        info!(
            user_id = %user_id,
            shared_user_id = %association.user_id,
            organization_id = %target_organization_id,
            "Association created"
        );
        associations.push(association);
        Ok(())
    }

    async fn remove_association(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> AppResult<bool> {
        self.calls.lock().await.push(AssociationCall::Remove {
            user_id,
            organization_id,
        });
        self.faults
            .check("remove_association", Some(organization_id))
            .await?;

        let mut associations = self.associations.lock().await;
        let before = associations.len();
        associations
            .retain(|a| !(a.associated_user_id == user_id && a.organization_id == organization_id));
        Ok(associations.len() < before)
    }

    async fn remove_all_associations(
        &self,
        user_id: UserId,
        root_organization_id: OrganizationId,
    ) -> AppResult<u64> {
        self.calls.lock().await.push(AssociationCall::RemoveAll {
            user_id,
            root_organization_id,
        });
        self.faults
            .check("remove_all_associations", Some(root_organization_id))
            .await?;

        let mut associations = self.associations.lock().await;
        let before = associations.len();
        associations.retain(|a| {
            !(a.associated_user_id == user_id
                && a.user_resident_organization_id == root_organization_id)
        });
        Ok((before - associations.len()) as u64)
    }
}
