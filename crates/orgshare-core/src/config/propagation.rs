//! Background propagation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tuning for the asynchronous share/unshare fan-out.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Maximum number of (user, organization) units running at once.
    #[serde(default = "default_max_concurrent_units")]
    #[validate(range(min = 1, max = 256))]
    pub max_concurrent_units: usize,
    /// Attempts per collaborator call, including the first one.
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds. Doubles per retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on a single retry delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Deadline for a single collaborator call, in milliseconds.
    #[serde(default = "default_operation_timeout_ms")]
    #[validate(range(min = 1))]
    pub operation_timeout_ms: u64,
    /// Capacity of the propagation event channel.
    #[serde(default = "default_event_buffer")]
    #[validate(range(min = 1))]
    pub event_buffer: usize,
}

impl PropagationConfig {
    /// Delay before the first retry.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Upper bound on the delay between retries.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Deadline for a single collaborator call.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_units: default_max_concurrent_units(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_max_concurrent_units() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    2000
}

fn default_operation_timeout_ms() -> u64 {
    5000
}

fn default_event_buffer() -> usize {
    256
}
