//! # orgshare-service
//!
//! The user sharing service. Validates share and unshare instructions,
//! expands distribution policies over the organization hierarchy, checks
//! per-user eligibility, and propagates associations and role grants in
//! the background.
//!
//! Collaborators are provided at construction time as `Arc<dyn Trait>`
//! references bundled in [`Collaborators`].

pub mod context;
pub mod sharing;

pub use context::ExecutionContext;
pub use sharing::{
    Collaborators, Eligibility, PropagationExecutor, StatsSnapshot, UserSharingService,
};
