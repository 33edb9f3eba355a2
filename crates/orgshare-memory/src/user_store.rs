//! In-memory multi-tenant user store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;
use orgshare_core::traits::UserStore;
use orgshare_core::types::{TenantId, UserId};

use crate::fault::FaultInjector;

/// A call observed by [`MemoryUserStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStoreCall {
    /// `tenant_id_for`.
    TenantId {
        /// Domain queried.
        tenant_domain: String,
    },
    /// `user_exists`.
    Exists {
        /// Tenant queried.
        tenant_id: TenantId,
        /// User queried.
        user_id: UserId,
    },
    /// `user_claims`.
    Claims {
        /// Tenant queried.
        tenant_id: TenantId,
        /// User queried.
        user_id: UserId,
        /// Claims requested.
        claim_names: Vec<String>,
    },
}

#[derive(Debug, Default)]
struct UserStoreState {
    tenants: HashMap<String, TenantId>,
    users: HashMap<(TenantId, UserId), HashMap<String, String>>,
}

/// User store holding every tenant's users and their claims.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    state: RwLock<UserStoreState>,
    calls: Mutex<Vec<UserStoreCall>>,
    faults: Arc<FaultInjector>,
}

impl MemoryUserStore {
    /// Creates an empty user store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a fault injector with other collaborators.
    pub fn with_faults(mut self, faults: Arc<FaultInjector>) -> Self {
        self.faults = faults;
        self
    }

    /// Register a tenant domain.
    pub fn with_tenant(mut self, tenant_domain: impl Into<String>, tenant_id: TenantId) -> Self {
        self.state
            .get_mut()
            .tenants
            .insert(tenant_domain.into(), tenant_id);
        self
    }

    /// Register a user without claims.
    pub fn with_user(mut self, tenant_id: TenantId, user_id: UserId) -> Self {
        self.state
            .get_mut()
            .users
            .insert((tenant_id, user_id), HashMap::new());
        self
    }

    /// Register a user with claims.
    pub fn with_user_claims(
        mut self,
        tenant_id: TenantId,
        user_id: UserId,
        claims: HashMap<String, String>,
    ) -> Self {
        self.state
            .get_mut()
            .users
            .insert((tenant_id, user_id), claims);
        self
    }

    /// Add (or replace) a user at runtime.
    pub async fn add_user(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        claims: HashMap<String, String>,
    ) {
        self.state
            .write()
            .await
            .users
            .insert((tenant_id, user_id), claims);
    }

    /// Every call observed so far.
    pub async fn calls(&self) -> Vec<UserStoreCall> {
        self.calls.lock().await.clone()
    }

    /// The fault injector consulted by this store.
    pub fn faults(&self) -> &Arc<FaultInjector> {
        &self.faults
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn tenant_id_for(&self, tenant_domain: &str) -> AppResult<TenantId> {
        self.calls.lock().await.push(UserStoreCall::TenantId {
            tenant_domain: tenant_domain.to_string(),
        });
        self.faults.check("tenant_id_for", None).await?;

        self.state
            .read()
            .await
            .tenants
            .get(tenant_domain)
            .copied()
            .ok_or_else(|| AppError::not_found(format!("Tenant '{tenant_domain}' not found")))
    }

    async fn user_exists(&self, tenant_id: TenantId, user_id: UserId) -> AppResult<bool> {
        self.calls
            .lock()
            .await
            .push(UserStoreCall::Exists { tenant_id, user_id });
        self.faults.check("user_exists", None).await?;

        Ok(self
            .state
            .read()
            .await
            .users
            .contains_key(&(tenant_id, user_id)))
    }

    async fn user_claims(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        claim_names: &[&str],
    ) -> AppResult<HashMap<String, String>> {
        self.calls.lock().await.push(UserStoreCall::Claims {
            tenant_id,
            user_id,
            claim_names: claim_names.iter().map(|c| c.to_string()).collect(),
        });
        self.faults.check("user_claims", None).await?;

        let state = self.state.read().await;
        let claims = state
            .users
            .get(&(tenant_id, user_id))
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        Ok(claim_names
            .iter()
            .filter_map(|name| claims.get(*name).map(|v| (name.to_string(), v.clone())))
            .collect())
    }
}
