use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::MapResponse;
use thoth_db::MapFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MapArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth map`.
pub async fn handle(args: &MapArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let index = ctx.index().await?;
    index.indexed_rev().await?;
    let view = index
        .map(&MapFilter {
            tag: args.tag.clone(),
            severity: args.severity,
            path: args.path.clone(),
        })
        .await?;
    output(
        &MapResponse {
            version: OUTPUT_VERSION,
            resources: view.resources,
            edges: view.edges,
        },
        flags.format,
    )
}
