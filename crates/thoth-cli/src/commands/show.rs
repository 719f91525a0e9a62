use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::ShowResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth show`.
pub async fn handle(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let index = ctx.index().await?;
    index.indexed_rev().await?;
    let detail = index.show(&args.resource_id).await?;
    output(
        &ShowResponse {
            version: OUTPUT_VERSION,
            detail,
        },
        flags.format,
    )
}
