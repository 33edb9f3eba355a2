//! # orgshare-core
//!
//! Core crate for OrgShare. Contains the collaborator traits the sharing
//! engine consumes, configuration schemas, typed identifiers, domain
//! events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other OrgShare crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
