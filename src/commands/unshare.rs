//! Unshare instruction commands.

use std::path::Path;

use orgshare_core::config::AppConfig;
use orgshare_core::result::AppResult;
use orgshare_entity::{GeneralUnshareRequest, SelectiveUnshareRequest};

use super::share::finish;
use super::{InstructionArgs, Session, read_request};
use crate::output::OutputFormat;

/// Run a selective unshare against the fixture.
pub async fn execute_selective(
    args: &InstructionArgs,
    fixture: &Path,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let session = Session::open(fixture, config).await?;
    let request: SelectiveUnshareRequest = read_request(&args.instruction).await?;

    session.service.unshare_selective(&session.ctx, Some(request))?;
    finish(&session, args, format, "Selective unshare").await
}

/// Run a general unshare against the fixture.
pub async fn execute_general(
    args: &InstructionArgs,
    fixture: &Path,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let session = Session::open(fixture, config).await?;
    let request: GeneralUnshareRequest = read_request(&args.instruction).await?;

    session.service.unshare_general(&session.ctx, Some(request))?;
    finish(&session, args, format, "General unshare").await
}
