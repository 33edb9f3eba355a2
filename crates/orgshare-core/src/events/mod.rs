//! Domain events emitted by OrgShare operations.
//!
//! Events are published by the propagation executor and consumed by
//! whoever subscribes: operators' telemetry, audit sinks, or tests waiting
//! for background work to settle.

pub mod sharing;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

pub use sharing::{InstructionKind, InstructionReport, SharingEvent, SkipReason};

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The caller whose instruction caused the event.
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A user-sharing event.
    Sharing(SharingEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Shortcut for a sharing event.
    pub fn sharing(actor_id: UserId, event: SharingEvent) -> Self {
        Self::new(Some(actor_id), EventPayload::Sharing(event))
    }

    /// The sharing payload, if this is a sharing event.
    pub fn as_sharing(&self) -> Option<&SharingEvent> {
        match &self.payload {
            EventPayload::Sharing(event) => Some(event),
        }
    }
}
