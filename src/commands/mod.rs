//! CLI command definitions and dispatch.

pub mod config;
pub mod report;
pub mod share;
pub mod unshare;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;

use orgshare_core::config::AppConfig;
use orgshare_core::error::{AppError, ErrorKind};
use orgshare_core::result::AppResult;
use orgshare_memory::{Fixture, MemoryCollaborators};
use orgshare_service::{Collaborators, ExecutionContext, UserSharingService};

use crate::output::OutputFormat;

/// OrgShare: propagate user access across an organization hierarchy
#[derive(Debug, Parser)]
#[command(name = "orgshare", version, about, long_about = None)]
pub struct Cli {
    /// Configuration directory, or a single TOML file
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Fixture describing the tenants, organizations, users and roles to
    /// run against. `fixtures/shared.json` starts with existing
    /// associations, for the unshare commands
    #[arg(long, default_value = "fixtures/demo.json")]
    pub fixture: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Share users into individually declared organizations
    ShareSelective(InstructionArgs),
    /// Share users across the hierarchy under one policy
    ShareGeneral(InstructionArgs),
    /// Remove users from listed organizations
    UnshareSelective(InstructionArgs),
    /// Remove users from every organization shared from the caller's
    UnshareGeneral(InstructionArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

/// Arguments shared by every instruction command
#[derive(Debug, Args)]
pub struct InstructionArgs {
    /// JSON file holding the request body
    #[arg(short, long)]
    pub instruction: PathBuf,

    /// How long to wait for propagation to settle, in seconds
    #[arg(long, default_value_t = 30)]
    pub wait_secs: u64,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::ShareSelective(args) => {
                share::execute_selective(args, &self.fixture, &config, self.format).await
            }
            Commands::ShareGeneral(args) => {
                share::execute_general(args, &self.fixture, &config, self.format).await
            }
            Commands::UnshareSelective(args) => {
                unshare::execute_selective(args, &self.fixture, &config, self.format).await
            }
            Commands::UnshareGeneral(args) => {
                unshare::execute_general(args, &self.fixture, &config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &config, &self.config, self.format),
        }
    }
}

/// Everything an instruction command runs against.
pub struct Session {
    /// In-memory collaborators built from the fixture.
    pub world: MemoryCollaborators,
    /// The sharing service wired to them.
    pub service: UserSharingService,
    /// The fixture's caller.
    pub ctx: ExecutionContext,
}

impl Session {
    /// Build collaborators from a fixture file and wire a service to them.
    pub async fn open(fixture_path: &Path, config: &AppConfig) -> AppResult<Self> {
        let fixture = Fixture::from_path(fixture_path).await?;
        let world = fixture.build()?;

        let root = fixture.caller.organization_id;
        let tenant_domain = fixture
            .organizations
            .iter()
            .find(|org| org.id == root)
            .map(|org| org.tenant_domain.clone())
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "Caller organization {root} is not part of the fixture"
                ))
            })?;
        let tenant_id = fixture.tenant_id(&tenant_domain)?;

        let ctx = ExecutionContext::new(
            fixture.caller.user_id,
            fixture.caller.username.clone(),
            tenant_id,
            tenant_domain,
            root,
        );

        let collaborators = Collaborators {
            hierarchy: world.hierarchy.clone(),
            users: world.users.clone(),
            associations: world.associations.clone(),
            roles: world.roles.clone(),
        };
        let service = UserSharingService::new(collaborators, &config.propagation)?;

        Ok(Self {
            world,
            service,
            ctx,
        })
    }

    /// Wait for propagation to settle, giving up after `wait_secs`.
    pub async fn settle(&self, wait_secs: u64) -> AppResult<()> {
        tokio::time::timeout(Duration::from_secs(wait_secs), self.service.drain())
            .await
            .map_err(|_| {
                AppError::timeout(format!("Propagation did not settle within {wait_secs}s"))
            })
    }
}

/// Read a request body from a JSON file.
pub async fn read_request<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to read instruction {}: {e}", path.display()),
            e,
        )
    })?;
    parse_request(&raw, &path.display().to_string())
}

/// Parse a request body. A body that does not fit the request shape, such
/// as an id that is not a UUID, is a validation error.
fn parse_request<T: DeserializeOwned>(raw: &str, origin: &str) -> AppResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("Invalid instruction {origin}: {e}"),
            e,
        )
    })
}

/// Load configuration from a directory (default + environment overlay) or
/// a single file.
pub fn load_config(path: &str) -> AppResult<AppConfig> {
    if path.ends_with(".toml") {
        return AppConfig::load_file(path);
    }
    let env = std::env::var("ORGSHARE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(path, &env)
}
