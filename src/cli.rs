use crate::logic::calculations::parse_date;
use crate::models::{LogLevel, PlantSource, Stage, Status};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "growlog", version, about = "Plant cultivation log")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run interactive setup
    Init,
    #[command(flatten)]
    Plant(PlantCommand),
}

/// Commands that open the plant database.
#[derive(Subcommand)]
pub enum PlantCommand {
    /// Validate config and stored plants
    Check,
    /// Start tracking a new plant
    Add {
        name: String,
        #[arg(long, value_parser = parse_source)]
        source: Option<PlantSource>,
        /// Germination or rooting date (defaults to today)
        #[arg(long, value_parser = parse_day)]
        started_on: Option<NaiveDate>,
        #[arg(long)]
        abbr: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List plants
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
        #[arg(long, value_parser = parse_stage)]
        stage: Option<Stage>,
        /// Include inactive and archived plants
        #[arg(long, conflicts_with = "status")]
        all: bool,
    },
    /// Show one plant
    Show { id: i64 },
    /// Apply a JSON patch, e.g. '{"stage": "veg"}'
    Update { id: i64, patch: String },
    /// Move a plant to another growth stage
    Stage {
        id: i64,
        #[arg(value_parser = parse_stage)]
        stage: Stage,
        /// Date the stage began (defaults to today)
        #[arg(long, value_parser = parse_day)]
        on: Option<NaiveDate>,
    },
    Rename { id: i64, name: String },
    Delete { id: i64 },
    Undelete { id: i64 },
    Archive { id: i64 },
    Unarchive { id: i64 },
    /// Show a plant's log
    Logs { id: i64 },
    /// Append a note to a plant's log
    Note {
        id: i64,
        message: String,
        #[arg(long, value_parser = parse_level, default_value = "info")]
        level: LogLevel,
    },
    /// Preview the harvest date for a stage entered on a given day
    Project {
        stage: String,
        #[arg(long, value_parser = parse_day)]
        from: NaiveDate,
    },
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got {}", s))
}

fn parse_stage(s: &str) -> Result<Stage, String> {
    Stage::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Stage::all().iter().map(|s| s.as_str()).collect();
        format!("unknown stage {} (expected one of: {})", s, names.join(", "))
    })
}

fn parse_status(s: &str) -> Result<Status, String> {
    Status::from_str(s).ok_or_else(|| format!("unknown status {}", s))
}

fn parse_source(s: &str) -> Result<PlantSource, String> {
    PlantSource::from_str(s).ok_or_else(|| format!("unknown source {} (seed or clone)", s))
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_str(s).ok_or_else(|| format!("unknown level {} (info, warn or error)", s))
}
