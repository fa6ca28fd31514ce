use super::{PlantRecord, PlantSource};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A plant record plus the bookkeeping the store keeps alongside it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlant {
    pub id: Option<i64>,
    pub abbr: String,
    pub source: PlantSource,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub record: PlantRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredPlant {
    pub fn new(record: PlantRecord, abbr: &str) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            abbr: abbr.to_string(),
            source: PlantSource::default(),
            notes: None,
            record,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_source(mut self, source: PlantSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }
}
