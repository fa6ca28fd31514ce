use crate::db::Database;
use crate::error::{GrowLogError, Result};
use crate::logic::calculations::{format_date, parse_date};
use crate::models::{
    DateField, DateSet, LogEntry, LogLevel, PlantContext, PlantDocument, PlantRecord, PlantSource,
    Stage, Status, StoredPlant,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

/// Optional filters for listing plants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlantFilter {
    pub status: Option<Status>,
    pub stage: Option<Stage>,
}

impl PlantFilter {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

const DATE_COLUMNS: [(DateField, &str); 8] = [
    (DateField::StartedOn, "started_on"),
    (DateField::VegStartedOn, "veg_started_on"),
    (DateField::FlowerStartedOn, "flower_started_on"),
    (DateField::HarvestedOn, "harvested_on"),
    (DateField::CureStartedOn, "cure_started_on"),
    (DateField::PotentialHarvest, "potential_harvest"),
    (DateField::ArchivedOn, "archived_on"),
    (DateField::DeletedOn, "deleted_on"),
];

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(format_date)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// Plant Queries

impl Database {
    pub fn insert_plant(&self, plant: &StoredPlant) -> Result<i64> {
        let doc = plant.record.to_document();
        let d = doc.dates;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO plants
                    (name, abbr, source, notes, status, stage,
                     started_on, veg_started_on, flower_started_on, harvested_on,
                     cure_started_on, potential_harvest, archived_on, deleted_on,
                     created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
                params![
                    doc.name,
                    plant.abbr,
                    plant.source.as_str(),
                    plant.notes,
                    doc.status.as_str(),
                    doc.stage.as_str(),
                    date_param(d.started_on),
                    date_param(d.veg_started_on),
                    date_param(d.flower_started_on),
                    date_param(d.harvested_on),
                    date_param(d.cure_started_on),
                    date_param(d.potential_harvest),
                    date_param(d.archived_on),
                    date_param(d.deleted_on),
                    plant.created_at.to_rfc3339(),
                    plant.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Fetch one plant, optionally only if it has the given status.
    pub fn get_plant(
        &self,
        id: i64,
        status: Option<Status>,
        ctx: &PlantContext,
    ) -> Result<Option<StoredPlant>> {
        let row = self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM plants WHERE id = ?1 AND (?2 IS NULL OR status = ?2)",
                params![id, status.map(|s| s.as_str())],
                row_to_plant,
            )
            .optional()
            .map_err(Into::into)
        })?;

        row.map(|r| r.into_stored(ctx)).transpose()
    }

    /// List plants matching `filter`. Rows that no longer validate are
    /// skipped with a warning.
    pub fn list_plants(&self, filter: &PlantFilter, ctx: &PlantContext) -> Result<Vec<StoredPlant>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM plants
                WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR stage = ?2)
                ORDER BY name COLLATE NOCASE, id
                "#,
            )?;
            let rows = stmt
                .query_map(
                    params![
                        filter.status.map(|s| s.as_str()),
                        filter.stage.map(|s| s.as_str())
                    ],
                    row_to_plant,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                row.into_stored(ctx)
                    .map_err(|e| warn!(plant_id = id, error = %e, "Skipping invalid plant row"))
                    .ok()
            })
            .collect())
    }

    pub fn update_plant(&self, plant: &StoredPlant) -> Result<()> {
        let id = plant
            .id
            .ok_or_else(|| GrowLogError::InvalidData("Plant has no ID".into()))?;
        let doc = plant.record.to_document();
        let d = doc.dates;

        let changed = self.with_conn(|conn| {
            Ok(conn.execute(
                r#"
                UPDATE plants SET
                    name = ?1, abbr = ?2, source = ?3, notes = ?4, status = ?5, stage = ?6,
                    started_on = ?7, veg_started_on = ?8, flower_started_on = ?9,
                    harvested_on = ?10, cure_started_on = ?11, potential_harvest = ?12,
                    archived_on = ?13, deleted_on = ?14, updated_at = ?15
                WHERE id = ?16
                "#,
                params![
                    doc.name,
                    plant.abbr,
                    plant.source.as_str(),
                    plant.notes,
                    doc.status.as_str(),
                    doc.stage.as_str(),
                    date_param(d.started_on),
                    date_param(d.veg_started_on),
                    date_param(d.flower_started_on),
                    date_param(d.harvested_on),
                    date_param(d.cure_started_on),
                    date_param(d.potential_harvest),
                    date_param(d.archived_on),
                    date_param(d.deleted_on),
                    Utc::now().to_rfc3339(),
                    id,
                ],
            )?)
        })?;

        if changed == 0 {
            return Err(GrowLogError::NotFound(format!("plant {}", id)));
        }
        Ok(())
    }

    /// True if another plant already uses `name` (case-insensitive).
    pub fn plant_name_exists(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                r#"
                SELECT COUNT(*) FROM plants
                WHERE name = ?1 COLLATE NOCASE AND (?2 IS NULL OR id != ?2)
                "#,
                params![name.trim(), exclude_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn plant_ids(&self) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM plants ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<i64>>>()?;
            Ok(ids)
        })
    }

    /// Abbreviations of active plants that start with `{base}-`.
    pub fn active_abbrs_with_base(&self, base: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT abbr FROM plants
                WHERE status = 'active' AND substr(abbr, 1, length(?1) + 1) = ?1 || '-'
                "#,
            )?;
            let abbrs = stmt
                .query_map([base], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(abbrs)
        })
    }
}

struct PlantRow {
    id: i64,
    name: String,
    abbr: String,
    source: String,
    notes: Option<String>,
    status: String,
    stage: String,
    dates: DateSet,
    created_at: String,
    updated_at: String,
}

fn row_to_plant(row: &Row) -> rusqlite::Result<PlantRow> {
    let id: i64 = row.get("id")?;

    let mut dates = DateSet::default();
    for (field, column) in DATE_COLUMNS {
        let raw: Option<String> = row.get(column)?;
        let parsed = raw.as_deref().and_then(|s| {
            parse_date(s).or_else(|| {
                warn!(plant_id = id, column, value = %s, "Unparsable date in database, ignoring");
                None
            })
        });
        dates.set(field, parsed);
    }

    Ok(PlantRow {
        id,
        name: row.get("name")?,
        abbr: row.get("abbr")?,
        source: row.get("source")?,
        notes: row.get("notes")?,
        status: row.get("status")?,
        stage: row.get("stage")?,
        dates,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl PlantRow {
    fn into_stored(self, ctx: &PlantContext) -> Result<StoredPlant> {
        let id = self.id;
        let invalid = |e: &dyn std::fmt::Display| {
            GrowLogError::InvalidData(format!("plant {}: {}", id, e))
        };

        let status = Status::from_str(&self.status)
            .ok_or_else(|| invalid(&format!("unknown plant status: {}", self.status)))?;
        let stage = Stage::from_str(&self.stage)
            .ok_or_else(|| invalid(&format!("unknown plant stage: {}", self.stage)))?;
        let source = PlantSource::from_str(&self.source).unwrap_or_else(|| {
            warn!(plant_id = id, source = %self.source, "Unknown source in database, defaulting to seed");
            PlantSource::Seed
        });

        let doc = PlantDocument {
            name: self.name,
            status,
            stage,
            dates: self.dates,
        };
        let record = PlantRecord::from_document(&doc, ctx.clone()).map_err(|e| invalid(&e))?;

        Ok(StoredPlant {
            id: Some(id),
            abbr: self.abbr,
            source,
            notes: self.notes,
            record,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        })
    }
}

// Log Queries

impl Database {
    pub fn add_log(&self, entry: &LogEntry) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO logs (plant_id, message, level, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.plant_id,
                    entry.message,
                    entry.level.as_str(),
                    entry.created_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_logs(&self, plant_id: i64) -> Result<Vec<LogEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM logs WHERE plant_id = ?1 ORDER BY created_at, id")?;
            let logs = stmt
                .query_map([plant_id], row_to_log)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(logs)
        })
    }

    pub fn get_log(&self, id: i64) -> Result<Option<LogEntry>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM logs WHERE id = ?1", [id], row_to_log)
                .optional()
                .map_err(Into::into)
        })
    }
}

fn row_to_log(row: &Row) -> rusqlite::Result<LogEntry> {
    let level_str: String = row.get("level")?;
    let created_at_str: String = row.get("created_at")?;

    let level = LogLevel::from_str(&level_str).unwrap_or_else(|| {
        warn!(level = %level_str, "Unknown log level in database, defaulting to info");
        LogLevel::Info
    });

    Ok(LogEntry {
        id: Some(row.get("id")?),
        plant_id: row.get("plant_id")?,
        message: row.get("message")?,
        level,
        created_at: parse_timestamp(&created_at_str),
    })
}
