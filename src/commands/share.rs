//! Share instruction commands.

use std::path::Path;

use orgshare_core::config::AppConfig;
use orgshare_core::result::AppResult;
use orgshare_entity::{GeneralShareRequest, SelectiveShareRequest};

use super::{InstructionArgs, Session, read_request, report};
use crate::output::{self, OutputFormat};

/// Run a selective share against the fixture.
pub async fn execute_selective(
    args: &InstructionArgs,
    fixture: &Path,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let session = Session::open(fixture, config).await?;
    let request: SelectiveShareRequest = read_request(&args.instruction).await?;

    session.service.share_selective(&session.ctx, Some(request))?;
    finish(&session, args, format, "Selective share").await
}

/// Run a general share against the fixture.
pub async fn execute_general(
    args: &InstructionArgs,
    fixture: &Path,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let session = Session::open(fixture, config).await?;
    let request: GeneralShareRequest = read_request(&args.instruction).await?;

    session.service.share_general(&session.ctx, Some(request))?;
    finish(&session, args, format, "General share").await
}

pub(super) async fn finish(
    session: &Session,
    args: &InstructionArgs,
    format: OutputFormat,
    label: &str,
) -> AppResult<()> {
    session.settle(args.wait_secs).await?;

    let stats = session.service.stats();
    if format == OutputFormat::Table {
        if stats.unit_failures > 0 {
            output::print_warning(&format!(
                "{label} settled with {} failed unit(s)",
                stats.unit_failures
            ));
        } else {
            output::print_success(&format!("{label} settled"));
        }
    }
    report::print(&session.world, stats, format).await;
    Ok(())
}
