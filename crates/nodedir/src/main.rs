//! `nodedir` - CLI for the participant directory
//!
//! This binary provides the command-line interface for browsing the
//! directory and for the gated admin operations.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use nodedir::cli::{
    AccessArgs, Cli, Command, ConfigCommand, ImportCommand, ListCommand, OutputFormat,
    ResetCommand, ThemeArg,
};
use nodedir::filter::{active_countries, unique_organizations, unique_roles};
use nodedir::ingest::OutcomeStatus;
use nodedir::storage::KeyValueStore;
use nodedir::{
    filter_participants, init_logging, view, AccessGate, AdminConsole, Config, ImagePolicy,
    Ingestor, MemoryBackend, RecordStore, Sheet, SqliteBackend, StorageStats,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Show(cmd) => handle_show(&config, &cmd.id, cmd.json),
        Command::Facets(cmd) => handle_facets(&config, cmd.json),
        Command::Add(cmd) => {
            let mut console = open_console(&config, &cmd.access)?;
            let added = console.add(cmd.form.into_form())?;
            println!("Identity node {} established.", added.id);
            print!("{}", view::card(&added));
            Ok(())
        }
        Command::Update(cmd) => {
            let mut console = open_console(&config, &cmd.access)?;
            let updated = console.update(&cmd.id, cmd.form.into_form())?;
            print!("{}", view::card(&updated));
            Ok(())
        }
        Command::Delete(cmd) => {
            let mut console = open_console(&config, &cmd.access)?;
            if console.delete(&cmd.id)? {
                println!("Deleted {}.", cmd.id);
            } else {
                println!("No participant with identifier {}.", cmd.id);
            }
            Ok(())
        }
        Command::Reset(cmd) => handle_reset(&config, &cmd),
        Command::Import(cmd) => handle_import(&config, &cmd).await,
        Command::Theme(cmd) => handle_theme(&config, cmd.choice),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<RecordStore<SqliteBackend>> {
    let path = config.database_path();
    let backend = SqliteBackend::open(&path, config.quota())
        .with_context(|| format!("opening directory database at {}", path.display()))?;
    Ok(RecordStore::new(backend))
}

fn console_over<B: KeyValueStore>(
    config: &Config,
    store: RecordStore<B>,
    access: &AccessArgs,
) -> anyhow::Result<AdminConsole<B>> {
    let mut console = AdminConsole::new(
        store,
        AccessGate::new(config.admin.access_code.clone()),
        ImagePolicy::from_config(&config.media),
        Ingestor::new(config.import.default_title.clone()),
    );
    let Some(code) = access.access_code.as_deref() else {
        bail!("this command needs --access-code (or NODEDIR_ACCESS_CODE)");
    };
    console.unlock(code)?;
    Ok(console)
}

fn open_console(
    config: &Config,
    access: &AccessArgs,
) -> anyhow::Result<AdminConsole<SqliteBackend>> {
    console_over(config, open_store(config)?, access)
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let records = open_store(config)?.list()?;
    let query = cmd.query();
    let visible = filter_participants(&records, &query);

    match cmd.format {
        OutputFormat::Json => println!("{}", view::json(&visible)?),
        OutputFormat::Table => print!("{}", view::table(&visible)),
        OutputFormat::Plain => {
            for participant in &visible {
                println!("{}", view::card(participant));
            }
        }
    }

    if cmd.format != OutputFormat::Json {
        if visible.is_empty() && query.is_active() {
            println!("No identity nodes match the current filters.");
        } else {
            println!("{} of {} identity nodes", visible.len(), records.len());
        }
    }
    Ok(())
}

fn handle_show(config: &Config, id: &str, json: bool) -> anyhow::Result<()> {
    let participant = open_store(config)?.get(id)?;
    if json {
        println!("{}", view::json(&participant)?);
    } else {
        print!("{}", view::profile(&participant));
    }
    Ok(())
}

fn handle_facets(config: &Config, json: bool) -> anyhow::Result<()> {
    let records = open_store(config)?.list()?;
    let countries = active_countries(&records);
    let organizations = unique_organizations(&records);
    let roles = unique_roles(&records);

    if json {
        let facets = serde_json::json!({
            "countries": countries,
            "organizations": organizations,
            "roles": roles,
        });
        println!("{}", serde_json::to_string_pretty(&facets)?);
        return Ok(());
    }

    println!("Countries");
    for country in &countries {
        println!("  {}  {country}", country.code);
    }
    println!();
    println!("Organizations");
    for org in &organizations {
        println!("  {org}");
    }
    println!();
    println!("Roles");
    for role in &roles {
        println!("  {role}");
    }
    Ok(())
}

fn handle_reset(config: &Config, cmd: &ResetCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will delete every participant and restore the default set.");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    let mut console = open_console(config, &cmd.access)?;
    let seeded = console.reset()?;
    println!("Directory reset to {} default identity nodes.", seeded.len());
    Ok(())
}

async fn handle_import(config: &Config, cmd: &ImportCommand) -> anyhow::Result<()> {
    let sheet = Sheet::from_path(&cmd.file, config.default_delimiter())
        .with_context(|| format!("reading {}", cmd.file.display()))?;
    let rows = sheet.len();

    let store = open_store(config)?;
    if cmd.dry_run {
        let scratch = MemoryBackend::snapshot(store.backend())?;
        let console = console_over(config, RecordStore::new(scratch), &cmd.access)?;
        run_import(console, sheet, cmd, rows).await
    } else {
        let console = console_over(config, store, &cmd.access)?;
        run_import(console, sheet, cmd, rows).await
    }
}

async fn run_import<B: KeyValueStore>(
    mut console: AdminConsole<B>,
    sheet: Sheet,
    cmd: &ImportCommand,
    rows: usize,
) -> anyhow::Result<()> {
    console.load_sheet(sheet)?;
    for (field, header) in &cmd.map {
        console.map_field(*field, header)?;
    }
    for field in &cmd.unmap {
        console.unmap_field(*field)?;
    }

    if !cmd.json {
        println!("Mapping ({rows} rows)");
        if let Some(mapping) = console.mapping() {
            for (field, header) in mapping.iter() {
                println!("  {field:<14} <- {header}");
            }
        }
    }

    if cmd.preview {
        console.abort_import();
        return Ok(());
    }

    let report = console.commit_import().await?;
    if cmd.json {
        println!("{}", view::json(&report)?);
        return Ok(());
    }

    println!();
    for outcome in &report.outcomes {
        match (&outcome.status, &outcome.reason) {
            (OutcomeStatus::Success, _) | (_, None) => {
                println!("  row {:>4}  {:<8} {}", outcome.row, outcome.status, outcome.identifier);
            }
            (_, Some(reason)) => println!(
                "  row {:>4}  {:<8} {} ({reason})",
                outcome.row, outcome.status, outcome.identifier
            ),
        }
    }
    println!();
    println!(
        "{} succeeded, {} skipped, {} failed",
        report.succeeded(),
        report.skipped(),
        report.failed()
    );
    if cmd.dry_run {
        println!("Dry run: nothing was written.");
    }
    println!("{}", report.summary());
    Ok(())
}

fn handle_theme(config: &Config, choice: Option<ThemeArg>) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let current = store.theme()?;
    let next = match choice {
        None => {
            println!("{current}");
            return Ok(());
        }
        Some(ThemeArg::Dark) => nodedir::Theme::Dark,
        Some(ThemeArg::Light) => nodedir::Theme::Light,
        Some(ThemeArg::Toggle) => current.toggled(),
    };
    store.set_theme(next)?;
    println!("{next}");
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let records = store.list()?.len();
    let theme = store.theme()?;
    let stats = StorageStats::collect(store.backend())?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "records": records,
            "slots": stats.slots,
            "used_bytes": stats.used_bytes,
            "quota_bytes": stats.quota,
            "theme": theme,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("nodedir status");
        println!("--------------");
        println!("Database:      {}", config.database_path().display());
        println!("Participants:  {records}");
        println!("Slots:         {}", stats.slots);
        match stats.quota {
            Some(quota) => println!("Usage:         {} of {quota} bytes", stats.used_bytes),
            None => println!("Usage:         {} bytes (no quota)", stats.used_bytes),
        }
        println!("Theme:         {theme}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut shown = config.clone();
                shown.admin.access_code = "(set)".to_string();
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                match config.quota() {
                    Some(quota) => println!("  Quota (bytes):      {quota}"),
                    None => println!("  Quota (bytes):      unlimited"),
                }
                println!();
                println!("[Admin]");
                println!("  Access code:        (set)");
                println!();
                println!("[Import]");
                println!("  Default title:      {}", config.import.default_title);
                println!(
                    "  Default delimiter:  {:?}",
                    config.import.default_delimiter
                );
                println!();
                println!("[Media]");
                println!("  Max image bytes:    {}", config.media.max_image_bytes);
                println!(
                    "  Trusted hosts:      {}",
                    config.media.trusted_hosts.join(", ")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
