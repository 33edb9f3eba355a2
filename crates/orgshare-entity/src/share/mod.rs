//! Share instructions.

pub mod model;
pub mod request;

pub use model::{GeneralShare, OrganizationShare, SelectiveShare, ShareInstruction};
pub use request::{GeneralShareRequest, OrganizationShareRequest, SelectiveShareRequest};
