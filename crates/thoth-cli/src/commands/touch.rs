use thoth_core::OUTPUT_VERSION;
use thoth_core::responses::{TouchInputs, TouchResponse, VcsInfo};
use thoth_vcs::VcsAdapter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::TouchArgs;
use crate::commands::revision_info;
use crate::context::AppContext;
use crate::output::output;

/// Handle `thoth touch`.
pub async fn handle(args: &TouchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let model = ctx.manifest()?;
    let vcs = ctx.vcs()?;
    let pipeline = ctx.pipeline()?;

    let diff = vcs.diff(args.base.as_deref(), args.target.as_deref())?;
    let result = pipeline.classify(&model, &diff);
    if result.incomplete {
        tracing::warn!(
            diagnostics = result.diagnostics.len(),
            "some files degraded; the touched set may under-report"
        );
    }

    let recorded = match (args.record, diff.target.as_deref()) {
        (true, Some(target)) => {
            let revision = revision_info(&vcs, target)?;
            let index = ctx.index().await?;
            index.record_touch(&result, &revision).await?;
            Some(revision.rev_id)
        }
        _ => None,
    };

    let response = TouchResponse {
        version: OUTPUT_VERSION,
        vcs: VcsInfo {
            backend: vcs.name().to_string(),
            base: diff.base.clone(),
            target: diff.target.clone(),
        },
        inputs: TouchInputs {
            files: diff.paths().map(str::to_string).collect(),
        },
        result,
        recorded,
    };
    output(&response, flags.format)
}
