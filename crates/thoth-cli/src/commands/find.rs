use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::FindResponse;
use thoth_db::FindOptions;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::FindArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth find`.
pub async fn handle(args: &FindArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let index = ctx.index().await?;
    index.indexed_rev().await?;
    let limit = args
        .limit
        .unwrap_or(ctx.config.general.default_limit as usize);
    let results = index
        .find(
            &args.handle,
            FindOptions {
                regex: args.regex,
                limit: Some(limit),
            },
        )
        .await?;
    output(
        &FindResponse {
            version: OUTPUT_VERSION,
            handle: args.handle.clone(),
            results,
        },
        flags.format,
    )
}
