//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::admin::{ImageInput, ParticipantForm};
use crate::filter::{DirectoryQuery, ALL};
use crate::ingest::TargetField;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Free-text search over name, organization, and title
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Residency code filter (e.g. DE)
    #[arg(long, default_value = ALL)]
    pub country: String,

    /// Exact organization filter
    #[arg(long, default_value = ALL)]
    pub org: String,

    /// Exact role title filter
    #[arg(long, default_value = ALL)]
    pub role: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl ListCommand {
    /// The directory query these arguments describe.
    #[must_use]
    pub fn query(&self) -> DirectoryQuery {
        DirectoryQuery {
            query: self.search.clone(),
            country: self.country.to_uppercase(),
            organization: self.org.clone(),
            role: self.role.clone(),
        }
    }
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Participant identifier
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Facets command arguments.
#[derive(Debug, Args)]
pub struct FacetsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Admin access code, required by every mutating command.
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Admin access code
    #[arg(long, env = "NODEDIR_ACCESS_CODE", hide_env_values = true)]
    pub access_code: Option<String>,
}

/// Participant fields shared by `add` and `update`.
#[derive(Debug, Default, Args)]
pub struct FormArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Role title
    #[arg(long)]
    pub title: Option<String>,

    /// Organization or ministry
    #[arg(long)]
    pub org: Option<String>,

    /// Residency catalog code
    #[arg(long)]
    pub country: Option<String>,

    /// Origin catalog code
    #[arg(long)]
    pub origin: Option<String>,

    /// Biography
    #[arg(long)]
    pub bio: Option<String>,

    /// Testimony
    #[arg(long)]
    pub testimony: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Website
    #[arg(long)]
    pub website: Option<String>,

    /// Portrait URL
    #[arg(long, conflicts_with = "photo_file")]
    pub photo: Option<String>,

    /// Local portrait image to embed
    #[arg(long, value_name = "FILE")]
    pub photo_file: Option<PathBuf>,

    /// Promotional image URL (empty to clear)
    #[arg(long, conflicts_with = "promo_file")]
    pub promo: Option<String>,

    /// Local promotional image to embed
    #[arg(long, value_name = "FILE")]
    pub promo_file: Option<PathBuf>,

    /// Event name (repeatable)
    #[arg(long = "event", value_name = "EVENT")]
    pub events: Vec<String>,
}

impl FormArgs {
    /// Convert to the admin form.
    #[must_use]
    pub fn into_form(self) -> ParticipantForm {
        ParticipantForm {
            name: self.name,
            title: self.title,
            organization: self.org,
            country_code: self.country,
            origin_code: self.origin,
            bio: self.bio,
            testimony: self.testimony,
            phone: self.phone,
            email: self.email,
            website: self.website,
            photo: image_input(self.photo, self.photo_file),
            promo_photo: image_input(self.promo, self.promo_file),
            events: (!self.events.is_empty()).then_some(self.events),
        }
    }
}

fn image_input(reference: Option<String>, file: Option<PathBuf>) -> Option<ImageInput> {
    file.map(ImageInput::File)
        .or_else(|| reference.map(ImageInput::Reference))
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Participant fields
    #[command(flatten)]
    pub form: FormArgs,

    /// Access
    #[command(flatten)]
    pub access: AccessArgs,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Participant identifier
    pub id: String,

    /// Fields to change
    #[command(flatten)]
    pub form: FormArgs,

    /// Access
    #[command(flatten)]
    pub access: AccessArgs,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Participant identifier
    pub id: String,

    /// Access
    #[command(flatten)]
    pub access: AccessArgs,
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Access
    #[command(flatten)]
    pub access: AccessArgs,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// CSV or TSV file with a header row
    pub file: PathBuf,

    /// Map a field to a header, e.g. `--map name="Full Name"` (repeatable)
    #[arg(long = "map", value_name = "FIELD=HEADER", value_parser = parse_mapping)]
    pub map: Vec<(TargetField, String)>,

    /// Leave a field unmapped (repeatable)
    #[arg(long = "unmap", value_name = "FIELD", value_parser = parse_field)]
    pub unmap: Vec<TargetField>,

    /// Show the mapping and stop
    #[arg(long, conflicts_with = "dry_run")]
    pub preview: bool,

    /// Import into a scratch copy and leave the database untouched
    #[arg(long)]
    pub dry_run: bool,

    /// Output the outcome log as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Access
    #[command(flatten)]
    pub access: AccessArgs,
}

fn parse_field(s: &str) -> Result<TargetField, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

fn parse_mapping(s: &str) -> Result<(TargetField, String), String> {
    let (field, header) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=HEADER, got '{s}'"))?;
    Ok((parse_field(field)?, header.trim().to_string()))
}

/// Theme command arguments.
#[derive(Debug, Args)]
pub struct ThemeCommand {
    /// New theme; omit to show the current one
    #[arg(value_enum)]
    pub choice: Option<ThemeArg>,
}

/// Theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    /// Dark theme
    Dark,
    /// Light theme
    Light,
    /// Switch to the other theme
    Toggle,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Directory cards
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
