//! User sharing entry points.

use tracing::warn;

use orgshare_core::config::PropagationConfig;
use orgshare_core::error::AppError;
use orgshare_core::events::{DomainEvent, InstructionKind};
use orgshare_core::result::AppResult;
use orgshare_entity::{
    GeneralShareRequest, GeneralUnshareRequest, SelectiveShareRequest, SelectiveUnshareRequest,
    ShareInstruction,
};
use tokio::sync::broadcast;

use super::executor::{Collaborators, PropagationExecutor};
use super::stats::{PropagationStats, StatsSnapshot};
use super::validator;
use crate::context::ExecutionContext;

/// Validates share and unshare instructions and hands them to the
/// propagation executor.
///
/// Every entry point returns as soon as validation passes. Propagation
/// outcomes are reported through [`UserSharingService::subscribe`] and
/// [`UserSharingService::stats`], never through the return value.
#[derive(Debug, Clone)]
pub struct UserSharingService {
    executor: PropagationExecutor,
}

impl UserSharingService {
    /// Creates a service spawning propagation onto the current runtime.
    pub fn new(collaborators: Collaborators, config: &PropagationConfig) -> AppResult<Self> {
        Ok(Self {
            executor: PropagationExecutor::new(collaborators, config)?,
        })
    }

    /// Creates a service around an existing executor.
    pub fn with_executor(executor: PropagationExecutor) -> Self {
        Self { executor }
    }

    /// Share users into individually declared organizations.
    pub fn share_selective(
        &self,
        ctx: &ExecutionContext,
        request: Option<SelectiveShareRequest>,
    ) -> AppResult<()> {
        let share = self.checked(
            InstructionKind::SelectiveShare,
            validator::validate_selective_share(request),
        )?;
        self.executor
            .submit_share(ctx.clone(), ShareInstruction::Selective(share));
        Ok(())
    }

    /// Share users across the hierarchy under one policy.
    pub fn share_general(
        &self,
        ctx: &ExecutionContext,
        request: Option<GeneralShareRequest>,
    ) -> AppResult<()> {
        let share = self.checked(
            InstructionKind::GeneralShare,
            validator::validate_general_share(request),
        )?;
        self.executor
            .submit_share(ctx.clone(), ShareInstruction::General(share));
        Ok(())
    }

    /// Remove users from an explicit list of organizations.
    pub fn unshare_selective(
        &self,
        ctx: &ExecutionContext,
        request: Option<SelectiveUnshareRequest>,
    ) -> AppResult<()> {
        let unshare = self.checked(
            InstructionKind::SelectiveUnshare,
            validator::validate_selective_unshare(request),
        )?;
        self.executor.submit_unshare(ctx.clone(), unshare);
        Ok(())
    }

    /// Remove users from every organization they were shared into from the
    /// caller's organization.
    pub fn unshare_general(
        &self,
        ctx: &ExecutionContext,
        request: Option<GeneralUnshareRequest>,
    ) -> AppResult<()> {
        let unshare = self.checked(
            InstructionKind::GeneralUnshare,
            validator::validate_general_unshare(request),
        )?;
        self.executor.submit_unshare(ctx.clone(), unshare);
        Ok(())
    }

    /// Counter snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.executor.stats()
    }

    /// Subscribe to propagation events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.executor.subscribe()
    }

    /// Wait for every accepted instruction to settle.
    pub async fn drain(&self) {
        self.executor.drain().await;
    }

    /// The underlying executor.
    pub fn executor(&self) -> &PropagationExecutor {
        &self.executor
    }

    fn checked<T>(&self, kind: InstructionKind, validated: AppResult<T>) -> AppResult<T> {
        validated.inspect_err(|err: &AppError| {
            PropagationStats::inc(&self.executor.counters().rejected);
            warn!(kind = %kind, error = %err, "Instruction rejected");
        })
    }
}
