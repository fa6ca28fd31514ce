use clap::Parser;
use growlog::app::App;
use growlog::cli::{Cli, Commands, PlantCommand};
use growlog::config::Config;
use growlog::db::{Database, PlantFilter};
use growlog::error::{GrowLogError, Result};
use growlog::logic::calculations::format_date;
use growlog::models::{DateField, LogEntry, Status, StoredPlant};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => {
            Config::setup_interactive(cli.config)?;
            Ok(())
        }
        Commands::Plant(command) => {
            let config = Config::load(cli.config.clone())?;
            let db_path = config.db_path(cli.data_dir.as_ref())?;
            let db = Database::open(&db_path)?;
            let app = App::new(config, db);
            let out = Output { json: cli.json };
            run_plant_command(&app, command, cli.config.as_ref(), &out)
        }
    }
}

fn run_plant_command(
    app: &App,
    command: PlantCommand,
    config_path: Option<&PathBuf>,
    out: &Output,
) -> Result<()> {
    match command {
        PlantCommand::Check => check(app, config_path),
        PlantCommand::Add {
            name,
            source,
            started_on,
            abbr,
            notes,
        } => {
            let mut input = Map::new();
            input.insert("name".into(), Value::String(name));
            if let Some(source) = source {
                input.insert("source".into(), json!(source.as_str()));
            }
            if let Some(date) = started_on {
                input.insert(DateField::StartedOn.as_str().into(), json!(format_date(date)));
            }
            if let Some(abbr) = abbr {
                input.insert("abbr".into(), Value::String(abbr));
            }
            if let Some(notes) = notes {
                input.insert("notes".into(), Value::String(notes));
            }
            let plant = app.add_plant(&Value::Object(input))?;
            out.plant(&plant)
        }
        PlantCommand::List { status, stage, all } => {
            let filter = PlantFilter {
                status: if all {
                    None
                } else {
                    Some(status.unwrap_or(Status::Active))
                },
                stage,
            };
            let plants = app.list_plants(&filter)?;
            if out.json {
                return out.print_json(&plants);
            }
            if plants.is_empty() {
                println!("No plants found.");
            }
            for plant in &plants {
                println!("{}", plant_line(plant));
            }
            Ok(())
        }
        PlantCommand::Show { id } => out.plant(&app.get_plant(id, None)?),
        PlantCommand::Update { id, patch } => {
            let patch: Value = serde_json::from_str(&patch)?;
            out.plant(&app.update_plant(id, &patch)?)
        }
        PlantCommand::Stage { id, stage, on } => out.plant(&app.change_stage(id, stage, on)?),
        PlantCommand::Rename { id, name } => out.plant(&app.rename_plant(id, &name)?),
        PlantCommand::Delete { id } => out.plant(&app.delete_plant(id)?),
        PlantCommand::Undelete { id } => out.plant(&app.undelete_plant(id)?),
        PlantCommand::Archive { id } => out.plant(&app.archive_plant(id)?),
        PlantCommand::Unarchive { id } => out.plant(&app.unarchive_plant(id)?),
        PlantCommand::Logs { id } => {
            let logs = app.logs(id)?;
            if out.json {
                return out.print_json(&logs);
            }
            for entry in &logs {
                println!("{}", log_line(entry));
            }
            Ok(())
        }
        PlantCommand::Note { id, message, level } => {
            let entry = app.add_note(id, &message, level)?;
            if out.json {
                return out.print_json(&entry);
            }
            println!("{}", log_line(&entry));
            Ok(())
        }
        PlantCommand::Project { stage, from } => {
            let harvest = app.preview_projection(&stage, from)?;
            if out.json {
                return out.print_json(&json!({
                    "stage": stage,
                    "from": format_date(from),
                    "potentialHarvest": harvest.map(format_date),
                }));
            }
            match harvest {
                Some(date) => println!("{}", format_date(date)),
                None => println!("No projection for stage {}", stage),
            }
            Ok(())
        }
    }
}

fn check(app: &App, config_path: Option<&PathBuf>) -> Result<()> {
    if Config::exists(config_path) {
        println!("Config: OK");
    } else {
        println!("Config: not found, using defaults (run `growlog init`)");
    }
    println!("Database: {}", app.db.path().display());

    let invalid = app.check()?;
    if invalid.is_empty() {
        println!("Plants: OK");
        return Ok(());
    }
    for plant in &invalid {
        println!("  {}", plant.error);
    }
    Err(GrowLogError::InvalidData(format!(
        "{} stored plant(s) failed validation",
        invalid.len()
    )))
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn plant(&self, plant: &StoredPlant) -> Result<()> {
        if self.json {
            return self.print_json(plant);
        }
        println!("{}", plant_line(plant));
        for &field in DateField::all() {
            if let Some(date) = plant.record.date(field) {
                println!("      {:<18} {}", field.as_str(), format_date(date));
            }
        }
        if let Some(days) = plant.record.days_until_harvest() {
            println!("      {:<18} {}", "daysUntilHarvest", days);
        }
        if let Some(notes) = &plant.notes {
            println!("      {:<18} {}", "notes", notes);
        }
        Ok(())
    }
}

fn plant_line(plant: &StoredPlant) -> String {
    format!(
        "{:>4}  {:<8} {:<28} {:<10} {:<9} {}",
        plant.id.unwrap_or_default(),
        plant.abbr,
        plant.name(),
        plant.record.stage().as_str(),
        plant.record.status().as_str(),
        plant
            .record
            .potential_harvest()
            .map(format_date)
            .unwrap_or_else(|| "-".into())
    )
}

fn log_line(entry: &LogEntry) -> String {
    format!(
        "{}  [{}] {}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.level,
        entry.message
    )
}
