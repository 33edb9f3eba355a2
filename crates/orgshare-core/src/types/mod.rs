//! Core type definitions used across the OrgShare workspace.

pub mod association;
pub mod audience;
pub mod id;

pub use association::{SharedType, UserAssociation};
pub use audience::RoleAudience;
pub use id::*;
