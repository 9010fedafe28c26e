use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use candidate_grid::api_client::AirtableClient;
use candidate_grid::config::config::Config;
use candidate_grid::data::columns::synthesize_columns;
use candidate_grid::data::field_collector::collect_fields;
use candidate_grid::data::record::{drop_empty_records, load_records_file, Record};
use candidate_grid::data::record_view::RecordView;
use candidate_grid::session::{identity_warning, Session, UserIdentity, UserPreferences};
use candidate_grid::store::availability::{AvailabilityStore, UpsertOutcome};
use candidate_grid::store::preferences::PreferencesStore;
use candidate_grid::store::templates::{save_error_message, TemplateStore};
use candidate_grid::store::StoreError;
use candidate_grid::table_display::{display_grid, export_to_csv_file};
use candidate_grid::ui::pin_manager::PinManager;
use candidate_grid::ui::tui_app::{run_tui, GridApp};
use candidate_grid::utils::app_paths::AppPaths;
use candidate_grid::utils::dual_logging::get_dual_logger;
use candidate_grid::utils::logging::init_tracing;
use candidate_grid::weekly_schedule::WeeklySchedule;

#[derive(Parser)]
#[command(name = "candidate-grid", version, about = "Browse candidate records in a terminal grid with pinned columns.")]
struct Cli {
    /// Load records from a JSON file instead of the remote source
    #[arg(long, value_name = "PATH")]
    from_file: Option<PathBuf>,

    /// Print the grid to stdout instead of starting the TUI
    #[arg(long)]
    print: bool,

    /// Write the grid to a CSV file instead of starting the TUI
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    generate_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Manage email templates
    #[command(subcommand)]
    Templates(TemplatesCommand),

    /// Save and inspect weekly availability
    #[command(subcommand)]
    Availability(AvailabilityCommand),
}

#[derive(Subcommand)]
enum TemplatesCommand {
    /// List templates, newest first
    List,
    /// Show one template
    Show { id: u64 },
    /// Create an empty template with the given title
    Create { title: String },
    /// Change a template's title and/or content
    Update(UpdateArgs),
}

#[derive(Args)]
struct UpdateArgs {
    id: u64,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
}

#[derive(Subcommand)]
enum AvailabilityCommand {
    /// Save the given slots for a person (created or updated by email)
    Save {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Option<String>,
        /// Comma separated slot ids such as Monday-09:00,Monday-09:30
        #[arg(long, value_delimiter = ',')]
        slots: Vec<String>,
    },
    /// Print the stored entry for an email
    Show {
        #[arg(long)]
        email: String,
    },
    /// Print the date range of a week relative to the current one
    Week {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.generate_config {
        match generate_config() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("Edit it to set the data source endpoint and your session identity.");
            }
            Err(e) => {
                eprintln!("{}", format!("Error: {:#}", e).red());
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn generate_config() -> Result<PathBuf> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    Ok(path)
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Warning: using default config ({:#})", e).yellow());
        Config::default()
    });

    let paths = AppPaths::new(config.data_dir()?);
    paths.ensure()?;
    let log_buffer = init_tracing(Some(&paths.log_dir()));

    let interactive = cli.command.is_none() && !cli.print && cli.export.is_none();
    if interactive {
        if let Some(logger) = get_dual_logger() {
            eprintln!("📝 Debug logs will be written to:");
            eprintln!("   {}", logger.log_path().display());
            eprintln!("   Tail with: tail -f {}", logger.log_path().display());
            eprintln!();
        }
    }

    let warning = identity_warning(&config.identity);
    if !interactive {
        if let Some(warning) = &warning {
            eprintln!("{}", warning.as_str().yellow());
        }
    }

    let preferences = PreferencesStore::open(paths.preferences_file())?;
    let user = UserIdentity::from_config(&config.session);
    let prefs = user
        .as_ref()
        .map(|u| preferences.load(&u.uid))
        .unwrap_or_else(UserPreferences::default);
    let session = Session::new(user, prefs);

    match cli.command {
        Some(Command::Templates(cmd)) => return run_templates(cmd, &paths, &session),
        Some(Command::Availability(cmd)) => return run_availability(cmd, &paths),
        None => {}
    }

    let records = load_records(&config, cli.from_file.as_deref())?;

    if cli.print || cli.export.is_some() {
        let columns = synthesize_columns(&collect_fields(&records));
        let mut pins = PinManager::with_default_width(config.table.default_frozen_width);
        if config.table.auto_pin {
            pins.auto_pin(&columns);
        }
        let ordered = pins.reorder(&columns);
        let view = RecordView::new(Arc::new(records));

        if let Some(path) = &cli.export {
            let rows = export_to_csv_file(path, &ordered, &view)?;
            println!("{}", format!("Exported {} rows to {}", rows, path.display()).green());
        }
        if cli.print {
            display_grid(&ordered, &view, pins.frozen_ids());
        }
        return Ok(());
    }

    let mut app = GridApp::new(records, &config, session)
        .with_preferences(preferences)
        .with_warning(warning)
        .with_log_buffer(log_buffer)
        .with_export_dir(std::env::current_dir().unwrap_or_else(|_| paths.data_dir().to_path_buf()));
    run_tui(&mut app)
}

fn load_records(config: &Config, from_file: Option<&Path>) -> Result<Vec<Record>> {
    let records = match from_file {
        Some(path) => load_records_file(path)?,
        None => {
            let client = AirtableClient::from_config(config)?;
            let runtime = tokio::runtime::Runtime::new().context("Cannot start async runtime")?;
            match runtime.block_on(client.fetch_all_records()) {
                Ok(records) => records,
                Err(e) => {
                    let hint = e.auth_hint(&config.data_source.api_key_env);
                    let err = anyhow::Error::new(e);
                    return Err(match hint {
                        Some(hint) => err.context(hint),
                        None => err,
                    });
                }
            }
        }
    };

    if config.data_source.drop_empty_records {
        Ok(drop_empty_records(records))
    } else {
        Ok(records)
    }
}

fn template_error(err: StoreError) -> anyhow::Error {
    tracing::warn!(target: "store", "Template save failed: {}", err);
    anyhow!(save_error_message(&err))
}

fn run_templates(cmd: TemplatesCommand, paths: &AppPaths, session: &Session) -> Result<()> {
    let mut store = TemplateStore::open(paths.templates_file())?;

    match cmd {
        TemplatesCommand::List => {
            let templates = store.list();
            if templates.is_empty() {
                println!("{}", "No templates yet.".yellow());
            }
            for t in templates {
                println!(
                    "{:>4}  {:<32} {:<16} {}",
                    t.id,
                    t.title,
                    t.author,
                    t.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        TemplatesCommand::Show { id } => {
            let t = store.get(id).ok_or(StoreError::NotFound(id))?;
            println!("{}", t.title.as_str().bold());
            println!("by {} on {}", t.author, t.created_at.format("%Y-%m-%d %H:%M"));
            println!();
            println!("{}", t.content);
        }
        TemplatesCommand::Create { title } => {
            let t = store.create(&title, &session.author_name()).map_err(template_error)?;
            println!("{}", format!("Created template {} '{}'", t.id, t.title).green());
        }
        TemplatesCommand::Update(args) => {
            let current = store.get(args.id).ok_or(StoreError::NotFound(args.id))?;
            let title = args.title.unwrap_or_else(|| current.title.clone());
            let content = args.content.unwrap_or_else(|| current.content.clone());
            let t = store.update(args.id, &title, &content).map_err(template_error)?;
            println!("{}", format!("Updated template {} '{}'", t.id, t.title).green());
        }
    }
    Ok(())
}

fn run_availability(cmd: AvailabilityCommand, paths: &AppPaths) -> Result<()> {
    let today = chrono::Local::now().date_naive();

    match cmd {
        AvailabilityCommand::Save {
            email,
            name,
            role,
            slots,
        } => {
            let schedule = WeeklySchedule::with_slots(today, slots.iter().filter(|s| !s.trim().is_empty()))?;
            let data = schedule.availability();
            let mut store = AvailabilityStore::open(paths.availability_file())?;
            let outcome = store
                .upsert(&email, &name, &data.to_json()?, role.as_deref())
                .context(candidate_grid::store::availability::SAVE_FAILED_MESSAGE)?;
            let verb = match outcome {
                UpsertOutcome::Created(_) => "Saved",
                UpsertOutcome::Updated(_) => "Updated",
            };
            println!("{}", format!("{} {} slots for {}", verb, data.total_slots, email).green());
        }
        AvailabilityCommand::Show { email } => {
            let store = AvailabilityStore::open(paths.availability_file())?;
            match store.find_by_email(&email) {
                Some(entry) => {
                    println!("{} <{}>", entry.name, entry.email);
                    if let Some(role) = &entry.role {
                        println!("Role: {}", role);
                    }
                    println!("{}", entry.availability);
                }
                None => println!("{}", format!("No availability saved for {}", email).yellow()),
            }
        }
        AvailabilityCommand::Week { offset } => {
            let mut schedule = WeeklySchedule::new(today);
            schedule.shift_weeks(offset)?;
            println!("{}", schedule.range_label());
            for (day, date) in schedule.week_days() {
                println!("  {:<10} {}", day, date.format("%b %-d"));
            }
        }
    }
    Ok(())
}
