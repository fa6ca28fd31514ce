use crate::config::Config;
use crate::db::{Database, PlantFilter};
use crate::error::{GrowLogError, Result};
use crate::logic::abbr::{base_abbr, is_numbered, is_valid_abbr, numbered_abbr};
use crate::logic::changes::{change_list, change_log_message};
use crate::logic::SystemClock;
use crate::models::{
    DateField, DateSet, LogEntry, LogLevel, PlantContext, PlantRecord, PlantSource, Stage, Status,
    StoredPlant,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// A stored row that failed to load, reported by [`App::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPlant {
    pub id: i64,
    pub error: String,
}

/// Plant operations backed by the database, with every change logged.
pub struct App {
    pub config: Config,
    pub db: Database,
    ctx: PlantContext,
}

impl App {
    pub fn new(config: Config, db: Database) -> Self {
        let ctx = PlantContext::new(Arc::new(SystemClock), config.projector());
        Self::with_context(config, db, ctx)
    }

    pub fn with_context(config: Config, db: Database, ctx: PlantContext) -> Self {
        Self { config, db, ctx }
    }

    pub fn context(&self) -> &PlantContext {
        &self.ctx
    }

    /// Create a plant from a loosely typed object. `source`, `notes` and
    /// `abbr` are read alongside the record fields.
    pub fn add_plant(&self, input: &Value) -> Result<StoredPlant> {
        let record = PlantRecord::from_value(input, self.ctx.clone())?;

        if self.db.plant_name_exists(record.name(), None)? {
            return Err(GrowLogError::Conflict(
                "A plant with that name already exists".into(),
            ));
        }

        let abbr = match string_field(input, "abbr")? {
            Some(abbr) if !abbr.trim().is_empty() => parse_abbr(abbr)?,
            _ => self.next_abbr(record.name())?,
        };

        let mut plant = StoredPlant::new(record, &abbr);
        if let Some(source) = string_field(input, "source")? {
            plant.source = parse_source(source)?;
        }
        plant.notes = string_field(input, "notes")?.map(str::to_string);

        let id = self.db.insert_plant(&plant)?;
        plant.id = Some(id);
        self.db.add_log(&LogEntry::new(id, "Plant created"))?;

        info!(plant_id = id, name = %plant.name(), abbr = %plant.abbr, "Plant created");
        Ok(plant)
    }

    pub fn get_plant(&self, id: i64, status: Option<Status>) -> Result<StoredPlant> {
        self.db
            .get_plant(id, status, &self.ctx)?
            .ok_or_else(|| GrowLogError::NotFound("Plant not found".into()))
    }

    pub fn list_plants(&self, filter: &PlantFilter) -> Result<Vec<StoredPlant>> {
        self.db.list_plants(filter, &self.ctx)
    }

    /// Apply a partial update. Unchanged plants are returned as-is with no
    /// write and no log entry.
    pub fn update_plant(&self, id: i64, patch: &Value) -> Result<StoredPlant> {
        let mut plant = self.get_plant(id, None)?;
        let record = plant.record.patched(patch)?;

        let mut extra = Vec::new();
        if patch.get("notes").is_some() {
            let notes = string_field(patch, "notes")?
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            if notes != plant.notes {
                extra.push(match &notes {
                    Some(n) => format!("notes changed to {}", n),
                    None => "notes cleared".to_string(),
                });
                plant.notes = notes;
            }
        }
        if let Some(source) = string_field(patch, "source")? {
            let source = parse_source(source)?;
            if source != plant.source {
                extra.push(format!("source changed to {}", source));
                plant.source = source;
            }
        }
        let abbr = match string_field(patch, "abbr")? {
            Some(abbr) if !abbr.trim().is_empty() => Some(parse_abbr(abbr)?),
            _ => None,
        };

        self.commit(plant, record, extra, abbr)
    }

    pub fn rename_plant(&self, id: i64, name: &str) -> Result<StoredPlant> {
        self.update_plant(id, &serde_json::json!({ "name": name }))
    }

    pub fn change_stage(&self, id: i64, stage: Stage, on: Option<NaiveDate>) -> Result<StoredPlant> {
        let plant = self.get_plant(id, None)?;
        let mut record = plant.record.clone();
        record.change_stage(stage, on)?;
        self.commit(plant, record, Vec::new(), None)
    }

    pub fn delete_plant(&self, id: i64) -> Result<StoredPlant> {
        self.transition(id, PlantRecord::delete)
    }

    pub fn undelete_plant(&self, id: i64) -> Result<StoredPlant> {
        self.transition(id, PlantRecord::undelete)
    }

    pub fn archive_plant(&self, id: i64) -> Result<StoredPlant> {
        self.transition(id, PlantRecord::archive)
    }

    pub fn unarchive_plant(&self, id: i64) -> Result<StoredPlant> {
        self.transition(id, PlantRecord::unarchive)
    }

    fn transition(&self, id: i64, op: fn(&mut PlantRecord) -> bool) -> Result<StoredPlant> {
        let plant = self.get_plant(id, None)?;
        let mut record = plant.record.clone();
        if !op(&mut record) {
            return Ok(plant);
        }
        self.commit(plant, record, Vec::new(), None)
    }

    /// Persist `record` into `plant` and log what changed. An explicit `abbr`
    /// replaces the stored one and suppresses regeneration on rename.
    fn commit(
        &self,
        mut plant: StoredPlant,
        record: PlantRecord,
        extra: Vec<String>,
        abbr: Option<String>,
    ) -> Result<StoredPlant> {
        let id = plant
            .id
            .ok_or_else(|| GrowLogError::InvalidData("Plant has no ID".into()))?;

        let abbr = abbr.filter(|a| *a != plant.abbr);
        let mut changes = change_list(&plant.record.to_document(), &record.to_document());
        changes.extend(extra);
        if let Some(abbr) = &abbr {
            changes.push(format!("abbr changed to {}", abbr));
        }
        if changes.is_empty() {
            debug!(plant_id = id, "No changes made to plant");
            return Ok(plant);
        }

        if record.name() != plant.name() {
            if self.db.plant_name_exists(record.name(), Some(id))? {
                return Err(GrowLogError::Conflict(
                    "A plant with that name already exists".into(),
                ));
            }
            if abbr.is_none() && base_abbr(record.name()) != base_abbr(plant.name()) {
                plant.abbr = self.next_abbr(record.name())?;
            }
        }
        if let Some(abbr) = abbr {
            plant.abbr = abbr;
        }

        plant.record = record;
        self.db.update_plant(&plant)?;

        if let Some(message) = change_log_message(&changes) {
            self.db.add_log(&LogEntry::new(id, &message))?;
        }
        info!(plant_id = id, changes = changes.len(), "Plant updated");
        Ok(plant)
    }

    fn next_abbr(&self, name: &str) -> Result<String> {
        let base = base_abbr(name);
        let taken = self
            .db
            .active_abbrs_with_base(&base)?
            .iter()
            .filter(|abbr| is_numbered(abbr, &base))
            .count();
        Ok(numbered_abbr(name, taken))
    }

    // Logs

    pub fn add_note(&self, id: i64, message: &str, level: LogLevel) -> Result<LogEntry> {
        let message = message.trim();
        if message.is_empty() {
            return Err(GrowLogError::InvalidData("Log message is required".into()));
        }
        self.get_plant(id, None)?;

        let mut entry = LogEntry::new(id, message).with_level(level);
        entry.id = Some(self.db.add_log(&entry)?);
        Ok(entry)
    }

    pub fn logs(&self, id: i64) -> Result<Vec<LogEntry>> {
        self.get_plant(id, None)?;
        self.db.list_logs(id)
    }

    pub fn get_log(&self, log_id: i64) -> Result<LogEntry> {
        self.db
            .get_log(log_id)?
            .ok_or_else(|| GrowLogError::NotFound("Log entry not found".into()))
    }

    // Projection

    /// Harvest date for a plant entering `stage` on `entered_on`, using the
    /// configured stage lengths and policy.
    pub fn preview_projection(&self, stage: &str, entered_on: NaiveDate) -> Result<Option<NaiveDate>> {
        let mut dates = DateSet::default();
        for field in [
            DateField::StartedOn,
            DateField::VegStartedOn,
            DateField::FlowerStartedOn,
        ] {
            dates.set(field, Some(entered_on));
        }
        Ok(self.ctx.projector().project_named(stage, &dates)?)
    }

    /// Load every stored plant and report the ones that no longer validate.
    pub fn check(&self) -> Result<Vec<InvalidPlant>> {
        let mut invalid = Vec::new();
        for id in self.db.plant_ids()? {
            if let Err(e) = self.db.get_plant(id, None, &self.ctx) {
                invalid.push(InvalidPlant {
                    id,
                    error: e.to_string(),
                });
            }
        }
        Ok(invalid)
    }
}

fn string_field<'a>(input: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(GrowLogError::InvalidData(format!("{} must be a string", key))),
    }
}

fn parse_abbr(raw: &str) -> Result<String> {
    let abbr = raw.trim();
    if !is_valid_abbr(abbr) {
        return Err(GrowLogError::InvalidData(format!(
            "'{}' is not valid. Plant abbreviations must be 2 to 10 letters, numbers, or '-' characters.",
            abbr
        )));
    }
    Ok(abbr.to_string())
}

fn parse_source(s: &str) -> Result<PlantSource> {
    PlantSource::from_str(s)
        .ok_or_else(|| GrowLogError::InvalidData(format!("unknown plant source: {}", s)))
}
