//! Unshare instructions.

pub mod model;
pub mod request;

pub use model::UnshareInstruction;
pub use request::{GeneralUnshareRequest, SelectiveUnshareRequest};
