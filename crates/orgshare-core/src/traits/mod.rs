//! Collaborator traits consumed by the sharing engine and implemented by
//! other crates.

pub mod association;
pub mod hierarchy;
pub mod role;
pub mod user_store;

pub use association::AssociationStore;
pub use hierarchy::OrganizationHierarchy;
pub use role::RoleManager;
pub use user_store::UserStore;
