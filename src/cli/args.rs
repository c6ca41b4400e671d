use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    name = "buddydocs",
    version,
    about = "Create, list, search and edit typed documents"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the data directory (overrides the configuration)
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the buddydocs application
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_type() {
        let cli = Cli::try_parse_from([
            "buddydocs", "--data-dir", "/tmp/x", "create", "-T", "Ideas", "--type", "wiki",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Create { title, doc_type, .. } => {
                assert_eq!(title, "Ideas");
                assert_eq!(doc_type.as_deref(), Some("wiki"));
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn deadline_requires_date_or_clear() {
        assert!(Cli::try_parse_from(["buddydocs", "deadline", "3"]).is_err());
        assert!(Cli::try_parse_from(["buddydocs", "deadline", "3", "--clear"]).is_ok());
        assert!(Cli::try_parse_from(["buddydocs", "deadline", "3", "2026-01-01"]).is_ok());
    }
}
