//! # orgshare-entity
//!
//! Instruction models for OrgShare. Each instruction exists in two forms:
//! a `*Request` that mirrors what the transport layer hands over (every
//! field optional, so absent values can be reported), and a validated
//! instruction the propagation engine consumes. All types derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`.

pub mod criteria;
pub mod policy;
pub mod role;
pub mod share;
pub mod unshare;

pub use criteria::{USER_IDS, UserCriteria};
pub use policy::SharingPolicy;
pub use role::{RoleReferenceRequest, RoleWithAudience};
pub use share::{
    GeneralShare, GeneralShareRequest, OrganizationShare, OrganizationShareRequest,
    SelectiveShare, SelectiveShareRequest, ShareInstruction,
};
pub use unshare::{
    GeneralUnshareRequest, SelectiveUnshareRequest, UnshareInstruction,
};
