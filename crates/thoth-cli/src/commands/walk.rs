use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::WalkResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WalkArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth walk`.
pub async fn handle(args: &WalkArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let index = ctx.index().await?;
    index.indexed_rev().await?;
    let walk = index.walk(&args.node, &args.edges, args.depth).await?;
    output(
        &WalkResponse {
            version: OUTPUT_VERSION,
            walk,
        },
        flags.format,
    )
}
