//! Post-propagation report shared by the instruction commands.

use serde::Serialize;
use tabled::Tabled;

use orgshare_memory::MemoryCollaborators;
use orgshare_service::StatsSnapshot;

use crate::output::{self, OutputFormat};

/// A live association, as displayed.
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRow {
    /// Resident user.
    #[tabled(rename = "User")]
    pub user_id: String,
    /// Target organization name.
    #[tabled(rename = "Organization")]
    pub organization: String,
    /// Shared identity in the target organization.
    #[tabled(rename = "Shared User")]
    pub shared_user_id: String,
    /// Shared type.
    #[tabled(rename = "Type")]
    pub shared_type: String,
}

/// A recorded role grant, as displayed.
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct GrantRow {
    /// Role ID.
    #[tabled(rename = "Role")]
    pub role_id: String,
    /// Shared user holding it.
    #[tabled(rename = "Shared User")]
    pub shared_user_id: String,
    /// Organization name.
    #[tabled(rename = "Organization")]
    pub organization: String,
}

/// A counter, as displayed.
#[derive(Debug, Serialize, Tabled)]
pub struct StatRow {
    /// Counter name.
    #[tabled(rename = "Counter")]
    pub counter: &'static str,
    /// Value.
    #[tabled(rename = "Value")]
    pub value: u64,
}

#[derive(Debug, Serialize)]
struct Report {
    associations: Vec<AssociationRow>,
    grants: Vec<GrantRow>,
    stats: StatsSnapshot,
}

/// Print what the in-memory world looks like after propagation.
pub async fn print(world: &MemoryCollaborators, stats: StatsSnapshot, format: OutputFormat) {
    let mut associations = Vec::new();
    for association in world.associations.associations().await {
        associations.push(AssociationRow {
            user_id: association.associated_user_id.to_string(),
            organization: organization_label(world, association.organization_id).await,
            shared_user_id: association.user_id.to_string(),
            shared_type: association.shared_type.to_string(),
        });
    }

    let mut grants = Vec::new();
    for grant in world.roles.grants().await {
        grants.push(GrantRow {
            role_id: grant.role_id.to_string(),
            shared_user_id: grant.shared_user_id.to_string(),
            organization: organization_label(world, grant.organization_id).await,
        });
    }

    match format {
        OutputFormat::Json => output::print_item(
            &Report {
                associations,
                grants,
                stats,
            },
            format,
        ),
        OutputFormat::Table => {
            output::print_table("Associations", &associations);
            output::print_table("Role grants", &grants);
            let rows: Vec<StatRow> = stats
                .entries()
                .into_iter()
                .map(|(counter, value)| StatRow { counter, value })
                .collect();
            output::print_table("Statistics", &rows);
        }
    }
}

async fn organization_label(
    world: &MemoryCollaborators,
    organization_id: orgshare_core::types::OrganizationId,
) -> String {
    world
        .hierarchy
        .name_of(organization_id)
        .await
        .unwrap_or_else(|| organization_id.to_string())
}
