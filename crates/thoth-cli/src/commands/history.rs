use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::HistoryResponse;
use thoth_db::HistoryFilter;
use thoth_vcs::{Revset, VcsAdapter};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HistoryArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth history`.
pub async fn handle(
    args: &HistoryArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let revs = match &args.rev {
        Some(revset) => {
            let revset: Revset = revset.parse()?;
            let ids: Vec<String> = ctx
                .vcs()?
                .log(&revset, None)?
                .into_iter()
                .map(|r| r.rev_id)
                .collect();
            tracing::debug!(%revset, revisions = ids.len(), "resolved revset");
            Some(ids)
        }
        None => None,
    };

    let index = ctx.index().await?;
    let revisions = index
        .history(
            &args.resource_id,
            &HistoryFilter {
                since: args.since,
                revs,
                limit: Some(
                    args.limit
                        .unwrap_or(ctx.config.general.default_limit as usize),
                ),
            },
        )
        .await?;
    output(
        &HistoryResponse {
            version: OUTPUT_VERSION,
            resource_id: args.resource_id.clone(),
            revisions,
        },
        flags.format,
    )
}
