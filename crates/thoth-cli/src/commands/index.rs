use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::{IndexBuildResponse, SymbolsResponse};
use thoth_vcs::VcsAdapter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::IndexCommands;
use crate::commands::revision_info;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth index build|symbols`.
pub async fn handle(
    action: &IndexCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        IndexCommands::Build { rev } => build(rev.as_deref(), ctx, flags).await,
        IndexCommands::Symbols { lang, path } => {
            let index = ctx.index().await?;
            index.indexed_rev().await?;
            let symbols = index.symbols(lang.as_deref(), path.as_deref()).await?;
            output(
                &SymbolsResponse {
                    version: OUTPUT_VERSION,
                    symbols,
                },
                flags.format,
            )
        }
    }
}

async fn build(rev: Option<&str>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let model = ctx.manifest()?;
    let vcs = ctx.vcs()?;
    let pipeline = ctx.pipeline()?;

    let rev_id = match rev {
        Some(rev) => vcs.resolve_rev(rev)?,
        None => vcs.current_rev()?,
    };
    let revision = revision_info(&vcs, &rev_id)?;
    let files = vcs.list_files(Some(&revision.rev_id))?;
    let snapshot = pipeline.snapshot(&files);
    for d in &snapshot.degraded {
        tracing::warn!(file = %d.path, stage = %d.stage, message = %d.message, "file degraded");
    }

    let index = ctx.index().await?;
    let report = index.build(&model, &snapshot, &revision.rev_id).await?;
    output(
        &IndexBuildResponse {
            version: OUTPUT_VERSION,
            report,
        },
        flags.format,
    )
}
