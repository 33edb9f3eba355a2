//! Association persistence.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{OrganizationId, SharedType, UserAssociation, UserId};

/// Persistence for user associations.
///
/// `create_association` must be idempotent: creating an association for a
/// pair that already has one leaves exactly one live association.
#[async_trait]
pub trait AssociationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Whether `user_id` already has associations rooted at
    /// `resident_organization_id`.
    async fn has_associations(
        &self,
        user_id: UserId,
        resident_organization_id: OrganizationId,
    ) -> AppResult<bool>;

    /// The association of `user_id` inside `organization_id`, if any.
    async fn association_in_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> AppResult<Option<UserAssociation>>;

    /// Share `user_id` from `root_organization_id` into
    /// `target_organization_id`.
    async fn create_association(
        &self,
        target_organization_id: OrganizationId,
        user_id: UserId,
        root_organization_id: OrganizationId,
        shared_type: SharedType,
    ) -> AppResult<()>;

    /// Remove the association of `user_id` inside `organization_id`.
    /// Returns `true` if an association was removed.
    async fn remove_association(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> AppResult<bool>;

    /// Remove every association of `user_id` rooted at
    /// `root_organization_id`. Returns the number removed.
    async fn remove_all_associations(
        &self,
        user_id: UserId,
        root_organization_id: OrganizationId,
    ) -> AppResult<u64>;
}
