//! In-memory organization hierarchy.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;
use orgshare_core::traits::OrganizationHierarchy;
use orgshare_core::types::OrganizationId;

use crate::fault::FaultInjector;

/// A call observed by [`MemoryHierarchy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyCall {
    /// `child_organization_ids`.
    Children {
        /// Organization queried.
        organization_id: OrganizationId,
        /// Whether descendants were requested.
        recursive: bool,
    },
    /// `resolve_tenant_domain`.
    TenantDomain {
        /// Organization queried.
        organization_id: OrganizationId,
    },
}

#[derive(Debug, Clone)]
struct OrganizationNode {
    name: String,
    parent_id: Option<OrganizationId>,
    tenant_domain: String,
}

#[derive(Debug, Default)]
struct HierarchyState {
    nodes: HashMap<OrganizationId, OrganizationNode>,
    /// Insertion order, so child listings are deterministic.
    order: Vec<OrganizationId>,
}

impl HierarchyState {
    fn children_of(&self, organization_id: OrganizationId) -> Vec<OrganizationId> {
        self.order
            .iter()
            .copied()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|node| node.parent_id == Some(organization_id))
            })
            .collect()
    }
}

/// Organization tree held in memory.
#[derive(Debug, Default)]
pub struct MemoryHierarchy {
    state: RwLock<HierarchyState>,
    calls: Mutex<Vec<HierarchyCall>>,
    faults: Arc<FaultInjector>,
}

impl MemoryHierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a fault injector with other collaborators.
    pub fn with_faults(mut self, faults: Arc<FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    /// Builder form of [`MemoryHierarchy::add_organization`].
    pub fn with_organization(
        mut self,
        organization_id: OrganizationId,
        name: impl Into<String>,
        parent_id: Option<OrganizationId>,
        tenant_domain: impl Into<String>,
    ) -> Self {
        insert_node(
            self.state.get_mut(),
            organization_id,
            name.into(),
            parent_id,
            tenant_domain.into(),
        );
        self
    }

    /// Add (or replace) an organization.
    pub async fn add_organization(
        &self,
        organization_id: OrganizationId,
        name: impl Into<String>,
        parent_id: Option<OrganizationId>,
        tenant_domain: impl Into<String>,
    ) {
        let mut state = self.state.write().await;
        insert_node(
            &mut state,
            organization_id,
            name.into(),
            parent_id,
            tenant_domain.into(),
        );
    }

    /// Display name of an organization.
    pub async fn name_of(&self, organization_id: OrganizationId) -> Option<String> {
        self.state
            .read()
            .await
            .nodes
            .get(&organization_id)
            .map(|node| node.name.clone())
    }

    /// Every call observed so far.
    pub async fn calls(&self) -> Vec<HierarchyCall> {
        self.calls.lock().await.clone()
    }

    /// Forget recorded calls.
    pub async fn reset_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// The fault injector consulted by this hierarchy.
    pub fn faults(&self) -> &Arc<FaultInjector> {
        &self.faults
    }
}

fn insert_node(
    state: &mut HierarchyState,
    organization_id: OrganizationId,
    name: String,
    parent_id: Option<OrganizationId>,
    tenant_domain: String,
) {
    if !state.nodes.contains_key(&organization_id) {
        state.order.push(organization_id);
    }
    state.nodes.insert(
        organization_id,
        OrganizationNode {
            name,
            parent_id,
            tenant_domain,
        },
    );
}

#[async_trait]
impl OrganizationHierarchy for MemoryHierarchy {
    async fn child_organization_ids(
        &self,
        organization_id: OrganizationId,
        recursive: bool,
    ) -> AppResult<Vec<OrganizationId>> {
        self.calls.lock().await.push(HierarchyCall::Children {
            organization_id,
            recursive,
        });
        self.faults
            .check("child_organization_ids", Some(organization_id))
            .await?;

        let state = self.state.read().await;
        if !state.nodes.contains_key(&organization_id) {
            return Err(AppError::not_found(format!(
                "Organization {organization_id} not found"
            )));
        }

        if !recursive {
            return Ok(state.children_of(organization_id));
        }

        let mut descendants = Vec::new();
        let mut queue: VecDeque<OrganizationId> = state.children_of(organization_id).into();
        while let Some(next) = queue.pop_front() {
            descendants.push(next);
            queue.extend(state.children_of(next));
        }

        debug!(
            organization_id = %organization_id,
            count = descendants.len(),
            "Resolved descendant organizations"
        );
        Ok(descendants)
    }

    async fn resolve_tenant_domain(&self, organization_id: OrganizationId) -> AppResult<String> {
        self.calls
            .lock()
            .await
            .push(HierarchyCall::TenantDomain { organization_id });
        self.faults
            .check("resolve_tenant_domain", Some(organization_id))
            .await?;

        self.state
            .read()
            .await
            .nodes
            .get(&organization_id)
            .map(|node| node.tenant_domain.clone())
            .ok_or_else(|| AppError::not_found(format!("Organization {organization_id} not found")))
    }
}
