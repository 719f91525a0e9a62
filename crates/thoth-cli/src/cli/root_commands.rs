use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use thoth_core::enums::Severity;

use crate::cli::subcommands::IndexCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Classify a diff into touched resources.
    Touch(TouchArgs),
    /// List resources and their edges.
    Map(MapArgs),
    /// Ranked search over resources.
    Find(FindArgs),
    /// Capsule view of one resource.
    Show(ShowArgs),
    /// Bounded subgraph around a resource.
    Walk(WalkArgs),
    /// Revisions that touched a resource.
    History(HistoryArgs),
    /// Graph index maintenance.
    Index {
        #[command(subcommand)]
        action: IndexCommands,
    },
    /// Print the JSON Schema of an output envelope.
    Schema(SchemaArgs),
}

/// Arguments for `thoth touch`.
#[derive(Clone, Debug, Args)]
pub struct TouchArgs {
    /// Base revision (defaults to HEAD).
    #[arg(long)]
    pub base: Option<String>,
    /// Target revision (defaults to the working tree).
    #[arg(long)]
    pub target: Option<String>,
    /// Record the result against the target revision in the index.
    #[arg(long, requires = "target")]
    pub record: bool,
}

/// Arguments for `thoth map`.
#[derive(Clone, Debug, Args)]
pub struct MapArgs {
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long, value_parser = parse_severity)]
    pub severity: Option<Severity>,
    /// Glob intersecting a resource's path bindings.
    #[arg(long)]
    pub path: Option<String>,
}

/// Arguments for `thoth find`.
#[derive(Clone, Debug, Args)]
pub struct FindArgs {
    /// Resource id, tag, path, symbol, region id, or `kw:"free text"`.
    pub handle: String,
    /// Treat the text part of the search as a regular expression.
    #[arg(long)]
    pub regex: bool,
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `thoth show`.
#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    pub resource_id: String,
}

/// Arguments for `thoth walk`.
#[derive(Clone, Debug, Args)]
pub struct WalkArgs {
    pub node: String,
    /// Edge types to follow (all when omitted).
    #[arg(long, value_delimiter = ',')]
    pub edges: Vec<String>,
    #[arg(long, default_value_t = 1)]
    pub depth: u32,
}

/// Arguments for `thoth history`.
#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    pub resource_id: String,
    /// Only revisions committed at or after this RFC 3339 instant.
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,
    #[arg(long)]
    pub limit: Option<usize>,
    /// Restrict to the revisions of a revset such as `main` or `A..B`.
    #[arg(long)]
    pub rev: Option<String>,
}

/// Arguments for `thoth schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Envelope name, e.g. `touch` or `index-build`.
    pub name: String,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse()
}
