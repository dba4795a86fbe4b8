//! Command-line interface for nodedir.
//!
//! This module provides the CLI structure for the `nodedir` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccessArgs, AddCommand, ConfigCommand, DeleteCommand, FacetsCommand, FormArgs, ImportCommand,
    ListCommand, OutputFormat, ResetCommand, ShowCommand, StatusCommand, ThemeArg, ThemeCommand,
    UpdateCommand,
};

/// nodedir - Browse and administer the participant directory
///
/// Lists, searches, and shows identity nodes, and lets an admin add, edit,
/// delete, or bulk-import them from a spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "nodedir")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List participants, optionally filtered
    List(ListCommand),

    /// Show one participant's profile
    Show(ShowCommand),

    /// Show the countries, organizations, and roles in use
    Facets(FacetsCommand),

    /// Add a participant (admin)
    Add(AddCommand),

    /// Edit a participant (admin)
    Update(UpdateCommand),

    /// Delete a participant (admin)
    Delete(DeleteCommand),

    /// Wipe all data and restore the default participants (admin)
    Reset(ResetCommand),

    /// Import participants from a spreadsheet (admin)
    Import(ImportCommand),

    /// Show or change the display theme
    Theme(ThemeCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::TargetField;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "nodedir");
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["nodedir", "-q", "status"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["nodedir", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["nodedir", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["nodedir", "-vv", "status"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = parse(&[
            "nodedir", "list", "-s", "alpha", "--country", "de", "--role", "CEO", "-f", "table",
        ]);
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.search, "alpha");
        assert_eq!(cmd.org, "ALL");
        assert_eq!(cmd.format, OutputFormat::Table);
        assert_eq!(cmd.query().country, "DE");
    }

    #[test]
    fn test_parse_show() {
        let cli = parse(&["nodedir", "show", "AB12C", "--json"]);
        assert!(matches!(cli.command, Command::Show(ShowCommand { json: true, .. })));
    }

    #[test]
    fn test_parse_add_with_access_code() {
        let cli = parse(&[
            "nodedir",
            "add",
            "--name",
            "Ada",
            "--org",
            "Society",
            "--country",
            "GB",
            "--event",
            "Forum",
            "--event",
            "Summit",
            "--access-code",
            "123",
        ]);
        let Command::Add(cmd) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(cmd.access.access_code.as_deref(), Some("123"));
        assert_eq!(cmd.form.events, vec!["Forum", "Summit"]);
    }

    #[test]
    fn test_photo_and_photo_file_conflict() {
        let result = Cli::try_parse_from([
            "nodedir",
            "update",
            "1",
            "--photo",
            "https://x.test/a.png",
            "--photo-file",
            "a.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_import_options() {
        let cli = parse(&[
            "nodedir",
            "import",
            "people.csv",
            "--map",
            "name=Full Name",
            "--unmap",
            "email",
            "--dry-run",
        ]);
        let Command::Import(cmd) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(cmd.file, PathBuf::from("people.csv"));
        assert_eq!(cmd.map, vec![(TargetField::Name, "Full Name".to_string())]);
        assert_eq!(cmd.unmap, vec![TargetField::Email]);
        assert!(cmd.dry_run);
        assert!(!cmd.preview);
    }

    #[test]
    fn test_preview_conflicts_with_dry_run() {
        let result =
            Cli::try_parse_from(["nodedir", "import", "a.csv", "--preview", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_import_rejects_unknown_field() {
        let result = Cli::try_parse_from(["nodedir", "import", "a.csv", "--map", "nick=Nick"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_theme() {
        let cli = parse(&["nodedir", "theme", "toggle"]);
        assert!(matches!(
            cli.command,
            Command::Theme(ThemeCommand {
                choice: Some(ThemeArg::Toggle)
            })
        ));
        let cli = parse(&["nodedir", "theme"]);
        assert!(matches!(cli.command, Command::Theme(ThemeCommand { choice: None })));
    }

    #[test]
    fn test_parse_reset() {
        let cli = parse(&["nodedir", "reset", "--yes"]);
        assert!(matches!(cli.command, Command::Reset(ResetCommand { yes: true, .. })));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = parse(&["nodedir", "config", "show", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["nodedir", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
