//! User sharing: validate instructions, expand policies, check
//! eligibility, and propagate associations and roles in the background.

pub mod eligibility;
pub mod executor;
pub mod resolver;
pub mod retry;
pub mod roles;
pub mod service;
pub mod stats;
pub mod validator;

pub use eligibility::{CLAIM_MANAGED_ORGANIZATION, Eligibility, EligibilityChecker};
pub use executor::{Collaborators, PropagationExecutor};
pub use resolver::PolicyResolver;
pub use retry::{Retrier, UnitError};
pub use roles::RoleGrantApplier;
pub use service::UserSharingService;
pub use stats::{PropagationStats, StatsSnapshot};
