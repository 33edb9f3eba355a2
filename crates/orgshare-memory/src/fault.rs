//! Fault injection for in-memory collaborators.

use std::time::Duration;

use tokio::sync::Mutex;

use orgshare_core::error::{AppError, ErrorKind};
use orgshare_core::result::AppResult;
use orgshare_core::types::OrganizationId;

/// What an injected fault does to a matching call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail the call with an error of this kind.
    Error(ErrorKind),
    /// Stall the call for this long before it proceeds.
    Delay(Duration),
}

#[derive(Debug)]
struct FaultRule {
    operation: &'static str,
    organization_id: Option<OrganizationId>,
    remaining: Option<u32>,
    fault: Fault,
}

/// Shared registry of faults, consulted by a collaborator on every call.
#[derive(Debug, Default)]
pub struct FaultInjector {
    rules: Mutex<Vec<FaultRule>>,
}

impl FaultInjector {
    /// Creates an injector with no faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject `fault` into calls of `operation`, optionally only those
    /// touching `organization_id`. `times` limits how often it fires;
    /// `None` fires forever.
    pub async fn inject(
        &self,
        operation: &'static str,
        organization_id: Option<OrganizationId>,
        times: Option<u32>,
        fault: Fault,
    ) {
        self.rules.lock().await.push(FaultRule {
            operation,
            organization_id,
            remaining: times,
            fault,
        });
    }

    /// Remove every injected fault.
    pub async fn clear(&self) {
        self.rules.lock().await.clear();
    }

    /// Apply the first matching fault to a call, if any.
    pub async fn check(
        &self,
        operation: &'static str,
        organization_id: Option<OrganizationId>,
    ) -> AppResult<()> {
        let fault = {
            let mut rules = self.rules.lock().await;
            let matched = rules.iter_mut().find(|rule| {
                rule.operation == operation
                    && rule.remaining != Some(0)
                    && (rule.organization_id.is_none() || rule.organization_id == organization_id)
            });
            match matched {
                Some(rule) => {
                    if let Some(remaining) = rule.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    Some(rule.fault)
                }
                None => None,
            }
        };

        match fault {
            Some(Fault::Error(kind)) => Err(AppError::new(
                kind,
                format!("Injected failure in {operation}"),
            )),
            Some(Fault::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
