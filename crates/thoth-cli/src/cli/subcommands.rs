use clap::Subcommand;

/// `thoth index` actions.
#[derive(Clone, Debug, Subcommand)]
pub enum IndexCommands {
    /// Rebuild the graph index from the manifest and a revision's tree.
    Build {
        /// Revision to index (defaults to HEAD).
        #[arg(long)]
        rev: Option<String>,
    },
    /// List indexed symbols.
    Symbols {
        /// Only symbols of this language tag.
        #[arg(long)]
        lang: Option<String>,
        /// Only symbols under this path prefix.
        #[arg(long)]
        path: Option<String>,
    },
}
