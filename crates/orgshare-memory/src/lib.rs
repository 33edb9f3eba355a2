//! In-memory collaborators for OrgShare.
//!
//! This crate provides:
//! - An organization hierarchy backed by a parent map
//! - A multi-tenant user store with per-user claims
//! - An idempotent association store
//! - A role manager keyed by role name and audience
//! - A fault injector shared by all of the above
//! - A JSON fixture loader that builds every collaborator from one document
//!
//! Every collaborator records the calls made to it so callers can verify
//! what the sharing engine did.

pub mod association;
pub mod fault;
pub mod fixture;
pub mod hierarchy;
pub mod role;
pub mod user_store;

use std::sync::Arc;

pub use association::{AssociationCall, MemoryAssociationStore};
pub use fault::{Fault, FaultInjector};
pub use fixture::{
    Fixture, FixtureCaller, FixtureOrganization, FixtureRole, FixtureTenant, FixtureUser,
};
pub use hierarchy::{HierarchyCall, MemoryHierarchy};
pub use role::{MemoryRoleManager, RoleCall, RoleGrant};
pub use user_store::{MemoryUserStore, UserStoreCall};

/// Concrete handles to one set of in-memory collaborators.
#[derive(Debug, Clone)]
pub struct MemoryCollaborators {
    /// Organization hierarchy.
    pub hierarchy: Arc<MemoryHierarchy>,
    /// Tenant user stores.
    pub users: Arc<MemoryUserStore>,
    /// Association store.
    pub associations: Arc<MemoryAssociationStore>,
    /// Role manager.
    pub roles: Arc<MemoryRoleManager>,
}
