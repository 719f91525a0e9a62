use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `thoth` binary.
#[derive(Debug, Parser)]
#[command(
    name = "thoth",
    version,
    about = "Thoth - governed architecture for code changes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only on stderr)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .thoth)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::subcommands::IndexCommands;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["thoth", "--format", "raw", "show", "wal_subsystem"])
            .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(matches!(cli.command, Commands::Show(ref a) if a.resource_id == "wal_subsystem"));

        let cli = Cli::try_parse_from(["thoth", "map", "--tag", "storage", "--verbose"])
            .expect("cli should parse");
        assert!(cli.verbose);
    }

    #[test]
    fn walk_edges_split_on_commas() {
        let cli = Cli::try_parse_from([
            "thoth",
            "walk",
            "wal_subsystem",
            "--edges",
            "depends-on,calls",
            "--depth",
            "3",
        ])
        .expect("cli should parse");
        let Commands::Walk(args) = cli.command else {
            panic!("expected walk");
        };
        assert_eq!(args.edges, vec!["depends-on", "calls"]);
        assert_eq!(args.depth, 3);
    }

    #[test]
    fn record_requires_a_target() {
        assert!(Cli::try_parse_from(["thoth", "touch", "--record"]).is_err());
        assert!(Cli::try_parse_from(["thoth", "touch", "--target", "HEAD", "--record"]).is_ok());
    }

    #[test]
    fn history_since_must_be_rfc3339() {
        assert!(
            Cli::try_parse_from(["thoth", "history", "wal", "--since", "2026-03-01T00:00:00Z"])
                .is_ok()
        );
        assert!(Cli::try_parse_from(["thoth", "history", "wal", "--since", "yesterday"]).is_err());
    }

    #[test]
    fn index_subcommands_parse() {
        let cli = Cli::try_parse_from(["thoth", "index", "symbols", "--lang", "go"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Index {
                action: IndexCommands::Symbols { lang: Some(ref l), path: None }
            } if l == "go"
        ));
    }

    #[test]
    fn severity_rejects_unknown_tiers() {
        assert!(Cli::try_parse_from(["thoth", "map", "--severity", "fatal"]).is_err());
        assert!(Cli::try_parse_from(["thoth", "--format", "table", "map"]).is_err());
    }
}
