//! Asynchronous share and unshare propagation.
//!
//! Every accepted instruction becomes one tracked task. That task checks
//! eligibility per user, resolves targets and roles once, then fans out one
//! task per (user, organization) unit. Units run under a shared semaphore
//! and fail independently; the caller never sees their outcome except
//! through events and statistics.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{Semaphore, SemaphorePermit, broadcast};
use tokio::task::JoinSet;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use orgshare_core::config::PropagationConfig;
use orgshare_core::error::{AppError, ErrorKind};
use orgshare_core::events::{
    DomainEvent, InstructionKind, InstructionReport, SharingEvent, SkipReason,
};
use orgshare_core::result::AppResult;
use orgshare_core::traits::{AssociationStore, OrganizationHierarchy, RoleManager, UserStore};
use orgshare_core::types::{InstructionId, OrganizationId, RoleId, SharedType, TenantId, UserId};
use orgshare_entity::{RoleWithAudience, ShareInstruction, SharingPolicy, UnshareInstruction};

use super::eligibility::{Eligibility, EligibilityChecker};
use super::resolver::PolicyResolver;
use super::retry::{Retrier, UnitError};
use super::roles::RoleGrantApplier;
use super::stats::{PropagationStats, StatsSnapshot};
use crate::context::ExecutionContext;

/// The services propagation talks to.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Organization tree.
    pub hierarchy: Arc<dyn OrganizationHierarchy>,
    /// Tenant user stores.
    pub users: Arc<dyn UserStore>,
    /// Association persistence.
    pub associations: Arc<dyn AssociationStore>,
    /// Role management.
    pub roles: Arc<dyn RoleManager>,
}

/// One organization a user gets shared into, with every role to grant
/// there.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetUnit {
    organization_id: OrganizationId,
    roles: Vec<RoleId>,
}

/// Tenant owning the root organization.
#[derive(Debug, Clone)]
struct RootTenant {
    domain: Arc<str>,
    id: TenantId,
}

#[derive(Debug)]
struct Engine {
    collaborators: Collaborators,
    resolver: PolicyResolver,
    eligibility: EligibilityChecker,
    role_applier: RoleGrantApplier,
    retrier: Retrier,
    stats: Arc<PropagationStats>,
    permits: Semaphore,
    events: broadcast::Sender<DomainEvent>,
}

/// Schedules propagation work off the caller's task.
#[derive(Debug, Clone)]
pub struct PropagationExecutor {
    engine: Arc<Engine>,
    tracker: TaskTracker,
    runtime: Handle,
}

impl PropagationExecutor {
    /// Creates an executor spawning onto the current Tokio runtime.
    pub fn new(collaborators: Collaborators, config: &PropagationConfig) -> AppResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                "Propagation executor must be created inside a Tokio runtime",
                e,
            )
        })?;
        Ok(Self::with_runtime(collaborators, config, runtime))
    }

    /// Creates an executor spawning onto `runtime`.
    pub fn with_runtime(
        collaborators: Collaborators,
        config: &PropagationConfig,
        runtime: Handle,
    ) -> Self {
        let stats = Arc::new(PropagationStats::new());
        let retrier = Retrier::new(config.clone(), stats.clone());
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        let engine = Engine {
            resolver: PolicyResolver::new(collaborators.hierarchy.clone()),
            eligibility: EligibilityChecker::new(
                collaborators.users.clone(),
                collaborators.associations.clone(),
            ),
            role_applier: RoleGrantApplier::new(collaborators.roles.clone(), retrier.clone()),
            collaborators,
            retrier,
            stats,
            permits: Semaphore::new(config.max_concurrent_units.max(1)),
            events,
        };

        Self {
            engine: Arc::new(engine),
            tracker: TaskTracker::new(),
            runtime,
        }
    }

    /// Live counters.
    pub fn counters(&self) -> &PropagationStats {
        &self.engine.stats
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.engine.stats.snapshot()
    }

    /// Subscribe to propagation events. Only events published after this
    /// call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.engine.events.subscribe()
    }

    /// Number of instructions still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every instruction scheduled so far has settled.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Schedule a validated share.
    pub fn submit_share(
        &self,
        ctx: ExecutionContext,
        instruction: ShareInstruction,
    ) -> InstructionId {
        let instruction_id = self.accept(&ctx, instruction.kind(), instruction.user_ids().len());
        let engine = self.engine.clone();
        self.tracker.spawn_on(
            async move {
                engine
                    .run_share(Arc::new(ctx), instruction_id, instruction)
                    .await
            },
            &self.runtime,
        );
        instruction_id
    }

    /// Schedule a validated unshare.
    pub fn submit_unshare(
        &self,
        ctx: ExecutionContext,
        instruction: UnshareInstruction,
    ) -> InstructionId {
        let instruction_id = self.accept(&ctx, instruction.kind(), instruction.user_ids().len());
        let engine = self.engine.clone();
        self.tracker.spawn_on(
            async move {
                engine
                    .run_unshare(Arc::new(ctx), instruction_id, instruction)
                    .await
            },
            &self.runtime,
        );
        instruction_id
    }

    fn accept(&self, ctx: &ExecutionContext, kind: InstructionKind, user_count: usize) -> InstructionId {
        let instruction_id = InstructionId::new();
        PropagationStats::inc(&self.engine.stats.accepted);
        info!(
            instruction_id = %instruction_id,
            kind = %kind,
            users = user_count,
            caller = %ctx.username,
            organization_id = %ctx.organization_id,
            "Instruction accepted"
        );
        self.engine.publish(
            ctx,
            SharingEvent::Accepted {
                instruction_id,
                kind,
                user_count,
            },
        );
        instruction_id
    }
}

impl Engine {
    fn publish(&self, ctx: &ExecutionContext, event: SharingEvent) {
        // No subscribers is fine.
        let _ = self.events.send(DomainEvent::sharing(ctx.user_id, event));
    }

    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        self.permits.acquire().await.ok()
    }

    fn unit_failed(
        &self,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        user_id: UserId,
        organization_id: Option<OrganizationId>,
        err: &UnitError,
        report: &mut InstructionReport,
    ) {
        PropagationStats::inc(&self.stats.unit_failures);
        report.failures += 1;

        match err {
            UnitError::Transient { .. } => warn!(
                instruction_id = %instruction_id,
                user_id = %user_id,
                organization_id = ?organization_id,
                error = %err,
                "Propagation unit gave up after retries"
            ),
            UnitError::Permanent { .. } => error!(
                instruction_id = %instruction_id,
                user_id = %user_id,
                organization_id = ?organization_id,
                error = %err,
                "Propagation unit failed"
            ),
        }

        self.publish(
            ctx,
            SharingEvent::UnitFailed {
                instruction_id,
                user_id,
                organization_id,
                operation: err.operation().to_string(),
                error: err.to_string(),
            },
        );
    }

    fn task_lost(&self, instruction_id: InstructionId, err: tokio::task::JoinError, report: &mut InstructionReport) {
        PropagationStats::inc(&self.stats.unit_failures);
        report.failures += 1;
        error!(instruction_id = %instruction_id, error = %err, "Propagation task aborted");
    }

    fn complete(
        &self,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        kind: InstructionKind,
        report: InstructionReport,
    ) {
        PropagationStats::inc(&self.stats.completed);
        info!(
            instruction_id = %instruction_id,
            kind = %kind,
            users = report.users,
            shared = report.shared,
            roles_granted = report.roles_granted,
            removed = report.removed,
            failures = report.failures,
            "Instruction settled"
        );
        self.publish(
            ctx,
            SharingEvent::Completed {
                instruction_id,
                kind,
                report,
            },
        );
    }

    // ── Share ─────────────────────────────────────────────────────────

    async fn run_share(
        self: Arc<Self>,
        ctx: Arc<ExecutionContext>,
        instruction_id: InstructionId,
        instruction: ShareInstruction,
    ) {
        let kind = instruction.kind();
        let user_ids = instruction.user_ids().to_vec();
        let mut report = InstructionReport {
            users: user_ids.len(),
            ..Default::default()
        };

        if !user_ids.is_empty() {
            match self.root_tenant(ctx.organization_id).await {
                Ok(tenant) => {
                    let proceed = self
                        .classify_users(&ctx, instruction_id, &user_ids, tenant.id, &mut report)
                        .await;
                    if !proceed.is_empty() {
                        let plan = self
                            .plan_targets(&ctx, instruction_id, &instruction, &proceed, &tenant, &mut report)
                            .await;
                        self.share_units(&ctx, instruction_id, &proceed, plan, &tenant, &mut report)
                            .await;
                    }
                }
                Err(err) => {
                    for &user_id in &user_ids {
                        self.unit_failed(&ctx, instruction_id, user_id, None, &err, &mut report);
                    }
                }
            }
        }

        self.complete(&ctx, instruction_id, kind, report);
    }

    async fn root_tenant(&self, root: OrganizationId) -> Result<RootTenant, UnitError> {
        let hierarchy = &self.collaborators.hierarchy;
        let users = &self.collaborators.users;

        let domain = self
            .retrier
            .run("resolve_tenant_domain", || hierarchy.resolve_tenant_domain(root))
            .await?;
        let id = self
            .retrier
            .run("tenant_id_for", || users.tenant_id_for(&domain))
            .await?;

        Ok(RootTenant {
            domain: domain.into(),
            id,
        })
    }

    /// Decide eligibility for every user; returns the users that proceed, in
    /// instruction order.
    async fn classify_users(
        self: &Arc<Self>,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        user_ids: &[UserId],
        tenant_id: TenantId,
        report: &mut InstructionReport,
    ) -> Vec<UserId> {
        let root = ctx.organization_id;
        let mut checks = JoinSet::new();
        for &user_id in user_ids {
            let engine = Arc::clone(self);
            checks.spawn(async move {
                let _permit = engine.permit().await;
                let outcome = engine
                    .retrier
                    .run("eligibility", || engine.eligibility.check(user_id, root, tenant_id))
                    .await;
                (user_id, outcome)
            });
        }

        let mut proceed = Vec::new();
        while let Some(joined) = checks.join_next().await {
            let (user_id, outcome) = match joined {
                Ok(result) => result,
                Err(err) => {
                    self.task_lost(instruction_id, err, report);
                    continue;
                }
            };

            match outcome {
                Ok(Eligibility::Proceed) => proceed.push(user_id),
                Ok(Eligibility::SkipAbsent) => {
                    PropagationStats::inc(&self.stats.skipped_absent);
                    report.skipped_absent += 1;
                    debug!(instruction_id = %instruction_id, user_id = %user_id, "Skipping absent user");
                    self.publish(
                        ctx,
                        SharingEvent::UserSkipped {
                            instruction_id,
                            user_id,
                            reason: SkipReason::Absent,
                        },
                    );
                }
                Ok(Eligibility::SkipNonResident) => {
                    PropagationStats::inc(&self.stats.skipped_non_resident);
                    report.skipped_non_resident += 1;
                    debug!(instruction_id = %instruction_id, user_id = %user_id, "Skipping non-resident user");
                    self.publish(
                        ctx,
                        SharingEvent::UserSkipped {
                            instruction_id,
                            user_id,
                            reason: SkipReason::NonResident,
                        },
                    );
                }
                Ok(Eligibility::UpdateExisting) => {
                    PropagationStats::inc(&self.stats.update_path);
                    report.updated += 1;
                    info!(
                        instruction_id = %instruction_id,
                        user_id = %user_id,
                        "User already shared from this organization, leaving existing associations"
                    );
                    self.publish(
                        ctx,
                        SharingEvent::UpdatePathTaken {
                            instruction_id,
                            user_id,
                        },
                    );
                }
                Err(err) => self.unit_failed(ctx, instruction_id, user_id, None, &err, report),
            }
        }

        user_ids
            .iter()
            .copied()
            .filter(|user_id| proceed.contains(user_id))
            .collect()
    }

    /// Resolve every entry's targets and roles once, merging entries that
    /// reach the same organization.
    async fn plan_targets(
        &self,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        instruction: &ShareInstruction,
        proceed: &[UserId],
        tenant: &RootTenant,
        report: &mut InstructionReport,
    ) -> Vec<TargetUnit> {
        let root = ctx.organization_id;
        let entries: Vec<(Option<OrganizationId>, SharingPolicy, &[RoleWithAudience])> =
            match instruction {
                ShareInstruction::Selective(share) => share
                    .organizations
                    .iter()
                    .map(|entry| (Some(entry.organization_id), entry.policy, entry.roles.as_slice()))
                    .collect(),
                ShareInstruction::General(share) => {
                    vec![(None, share.policy, share.roles.as_slice())]
                }
            };

        let mut units: Vec<TargetUnit> = Vec::new();
        for (declared, policy, roles) in entries {
            let anchor = declared.unwrap_or(root);
            let targets = match self
                .retrier
                .run("child_organization_ids", || {
                    self.resolver.resolve(root, declared, policy)
                })
                .await
            {
                Ok(targets) => targets,
                Err(err) => {
                    for &user_id in proceed {
                        self.unit_failed(ctx, instruction_id, user_id, Some(anchor), &err, report);
                    }
                    continue;
                }
            };
            if targets.is_empty() {
                debug!(
                    instruction_id = %instruction_id,
                    organization_id = %anchor,
                    policy = %policy,
                    "Policy reaches no organizations"
                );
                continue;
            }

            let mut role_ids = Vec::with_capacity(roles.len());
            for resolved in self
                .role_applier
                .resolve_all(roles, root, &tenant.domain)
                .await
            {
                match resolved {
                    Ok(role_id) => role_ids.push(role_id),
                    Err(err) => {
                        for &user_id in proceed {
                            self.unit_failed(ctx, instruction_id, user_id, Some(anchor), &err, report);
                        }
                    }
                }
            }

            for organization_id in targets {
                match units.iter_mut().find(|u| u.organization_id == organization_id) {
                    Some(unit) => {
                        for role_id in &role_ids {
                            if !unit.roles.contains(role_id) {
                                unit.roles.push(*role_id);
                            }
                        }
                    }
                    None => units.push(TargetUnit {
                        organization_id,
                        roles: role_ids.clone(),
                    }),
                }
            }
        }
        units
    }

    async fn share_units(
        self: &Arc<Self>,
        ctx: &Arc<ExecutionContext>,
        instruction_id: InstructionId,
        proceed: &[UserId],
        plan: Vec<TargetUnit>,
        tenant: &RootTenant,
        report: &mut InstructionReport,
    ) {
        let mut tasks = JoinSet::new();
        for &user_id in proceed {
            for unit in &plan {
                let engine = Arc::clone(self);
                let ctx = Arc::clone(ctx);
                let unit = unit.clone();
                let domain = Arc::clone(&tenant.domain);
                tasks.spawn(async move {
                    engine
                        .share_unit(&ctx, instruction_id, user_id, unit, &domain)
                        .await
                });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(partial) => report.absorb(&partial),
                Err(err) => self.task_lost(instruction_id, err, report),
            }
        }
    }

    async fn share_unit(
        &self,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        user_id: UserId,
        unit: TargetUnit,
        root_tenant_domain: &str,
    ) -> InstructionReport {
        let mut report = InstructionReport::default();
        let _permit = self.permit().await;
        let root = ctx.organization_id;
        let organization_id = unit.organization_id;
        let associations = &self.collaborators.associations;

        if let Err(err) = self
            .retrier
            .run("create_association", || {
                associations.create_association(organization_id, user_id, root, SharedType::Shared)
            })
            .await
        {
            self.unit_failed(ctx, instruction_id, user_id, Some(organization_id), &err, &mut report);
            return report;
        }

        let lookup = self
            .retrier
            .run("association_in_organization", || {
                associations.association_in_organization(user_id, organization_id)
            })
            .await
            .and_then(|association| {
                association.ok_or_else(|| UnitError::Permanent {
                    operation: "association_in_organization",
                    source: AppError::not_found(format!(
                        "No association for user {user_id} in organization {organization_id} after sharing"
                    )),
                })
            });
        let shared_user_id = match lookup {
            Ok(association) => association.user_id,
            Err(err) => {
                self.unit_failed(ctx, instruction_id, user_id, Some(organization_id), &err, &mut report);
                return report;
            }
        };

        PropagationStats::inc(&self.stats.associations_created);
        report.shared += 1;
        info!(
            instruction_id = %instruction_id,
            user_id = %user_id,
            organization_id = %organization_id,
            shared_user_id = %shared_user_id,
            "User shared"
        );
        self.publish(
            ctx,
            SharingEvent::UserShared {
                instruction_id,
                user_id,
                organization_id,
                shared_user_id,
            },
        );

        for role_id in unit.roles {
            match self
                .role_applier
                .grant(role_id, shared_user_id, organization_id, root_tenant_domain)
                .await
            {
                Ok(()) => {
                    PropagationStats::inc(&self.stats.roles_granted);
                    report.roles_granted += 1;
                    self.publish(
                        ctx,
                        SharingEvent::RoleGranted {
                            instruction_id,
                            user_id,
                            organization_id,
                            role_id,
                        },
                    );
                }
                Err(err) => {
                    self.unit_failed(ctx, instruction_id, user_id, Some(organization_id), &err, &mut report)
                }
            }
        }

        report
    }

    // ── Unshare ───────────────────────────────────────────────────────

    async fn run_unshare(
        self: Arc<Self>,
        ctx: Arc<ExecutionContext>,
        instruction_id: InstructionId,
        instruction: UnshareInstruction,
    ) {
        let kind = instruction.kind();
        let mut report = InstructionReport {
            users: instruction.user_ids().len(),
            ..Default::default()
        };

        let mut tasks = JoinSet::new();
        match instruction {
            UnshareInstruction::Selective {
                user_ids,
                organizations,
            } => {
                for &user_id in &user_ids {
                    for &organization_id in &organizations {
                        let engine = Arc::clone(&self);
                        let ctx = Arc::clone(&ctx);
                        tasks.spawn(async move {
                            engine
                                .unshare_unit(&ctx, instruction_id, user_id, organization_id)
                                .await
                        });
                    }
                }
            }
            UnshareInstruction::General { user_ids } => {
                for &user_id in &user_ids {
                    let engine = Arc::clone(&self);
                    let ctx = Arc::clone(&ctx);
                    tasks.spawn(async move { engine.unshare_all(&ctx, instruction_id, user_id).await });
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(partial) => report.absorb(&partial),
                Err(err) => self.task_lost(instruction_id, err, &mut report),
            }
        }

        self.complete(&ctx, instruction_id, kind, report);
    }

    async fn unshare_unit(
        &self,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> InstructionReport {
        let mut report = InstructionReport::default();
        let _permit = self.permit().await;
        let associations = &self.collaborators.associations;

        match self
            .retrier
            .run("remove_association", || {
                associations.remove_association(user_id, organization_id)
            })
            .await
        {
            Ok(true) => {
                PropagationStats::inc(&self.stats.associations_removed);
                report.removed += 1;
                info!(
                    instruction_id = %instruction_id,
                    user_id = %user_id,
                    organization_id = %organization_id,
                    "User unshared"
                );
                self.publish(
                    ctx,
                    SharingEvent::UserUnshared {
                        instruction_id,
                        user_id,
                        organization_id,
                    },
                );
            }
            Ok(false) => debug!(
                instruction_id = %instruction_id,
                user_id = %user_id,
                organization_id = %organization_id,
                "No association to remove"
            ),
            Err(err) => {
                self.unit_failed(ctx, instruction_id, user_id, Some(organization_id), &err, &mut report)
            }
        }
        report
    }

    async fn unshare_all(
        &self,
        ctx: &ExecutionContext,
        instruction_id: InstructionId,
        user_id: UserId,
    ) -> InstructionReport {
        let mut report = InstructionReport::default();
        let _permit = self.permit().await;
        let root = ctx.organization_id;
        let associations = &self.collaborators.associations;

        match self
            .retrier
            .run("remove_all_associations", || {
                associations.remove_all_associations(user_id, root)
            })
            .await
        {
            Ok(removed) => {
                PropagationStats::add(&self.stats.associations_removed, removed);
                report.removed += removed;
                info!(
                    instruction_id = %instruction_id,
                    user_id = %user_id,
                    removed,
                    "User unshared from every organization"
                );
                self.publish(
                    ctx,
                    SharingEvent::AllUnshared {
                        instruction_id,
                        user_id,
                        removed,
                    },
                );
            }
            Err(err) => self.unit_failed(ctx, instruction_id, user_id, Some(root), &err, &mut report),
        }
        report
    }
}
