use schemars::schema_for;
use thoth_core::responses::{
    FindResponse, HistoryResponse, IndexBuildResponse, MapResponse, ShowResponse,
    SymbolsResponse, TouchResponse, WalkResponse,
};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Names accepted by `thoth schema`, sorted.
pub const SCHEMA_NAMES: &[&str] = &[
    "find",
    "history",
    "index-build",
    "index-symbols",
    "map",
    "show",
    "touch",
    "walk",
];

/// JSON Schema of the envelope printed by the named command.
pub fn schema(name: &str) -> anyhow::Result<serde_json::Value> {
    let schema = match name {
        "touch" => schema_for!(TouchResponse),
        "map" => schema_for!(MapResponse),
        "find" => schema_for!(FindResponse),
        "show" => schema_for!(ShowResponse),
        "walk" => schema_for!(WalkResponse),
        "history" => schema_for!(HistoryResponse),
        "index-build" => schema_for!(IndexBuildResponse),
        "index-symbols" => schema_for!(SymbolsResponse),
        other => anyhow::bail!(
            "unknown schema '{other}' (expected one of: {})",
            SCHEMA_NAMES.join(", ")
        ),
    };
    Ok(serde_json::to_value(schema)?)
}

/// Handle `thoth schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema(&args.name)?, flags.format)
}
