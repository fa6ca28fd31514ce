use super::{RuleScope, Stage, Status};
use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Every date-bearing field of a plant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    StartedOn,
    VegStartedOn,
    FlowerStartedOn,
    HarvestedOn,
    CureStartedOn,
    PotentialHarvest,
    ArchivedOn,
    DeletedOn,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::StartedOn => "startedOn",
            DateField::VegStartedOn => "vegStartedOn",
            DateField::FlowerStartedOn => "flowerStartedOn",
            DateField::HarvestedOn => "harvestedOn",
            DateField::CureStartedOn => "cureStartedOn",
            DateField::PotentialHarvest => "potentialHarvest",
            DateField::ArchivedOn => "archivedOn",
            DateField::DeletedOn => "deletedOn",
        }
    }

    /// Accepts the camelCase name as well as snake_case and kebab-case spellings.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "startedon" => Some(DateField::StartedOn),
            "vegstartedon" => Some(DateField::VegStartedOn),
            "flowerstartedon" => Some(DateField::FlowerStartedOn),
            "harvestedon" => Some(DateField::HarvestedOn),
            "curestartedon" => Some(DateField::CureStartedOn),
            "potentialharvest" => Some(DateField::PotentialHarvest),
            "archivedon" => Some(DateField::ArchivedOn),
            "deletedon" => Some(DateField::DeletedOn),
            _ => None,
        }
    }

    pub fn all() -> &'static [DateField] {
        &[
            DateField::StartedOn,
            DateField::VegStartedOn,
            DateField::FlowerStartedOn,
            DateField::HarvestedOn,
            DateField::CureStartedOn,
            DateField::PotentialHarvest,
            DateField::ArchivedOn,
            DateField::DeletedOn,
        ]
    }

    /// Projections describe the future, so they are exempt from the
    /// no-future-dates check.
    pub fn is_derived(&self) -> bool {
        matches!(self, DateField::PotentialHarvest)
    }
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flat bag of optional dates, the shape the rule tables check against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSet {
    pub started_on: Option<NaiveDate>,
    pub veg_started_on: Option<NaiveDate>,
    pub flower_started_on: Option<NaiveDate>,
    pub harvested_on: Option<NaiveDate>,
    pub cure_started_on: Option<NaiveDate>,
    pub potential_harvest: Option<NaiveDate>,
    pub archived_on: Option<NaiveDate>,
    pub deleted_on: Option<NaiveDate>,
}

impl DateSet {
    pub fn get(&self, field: DateField) -> Option<NaiveDate> {
        match field {
            DateField::StartedOn => self.started_on,
            DateField::VegStartedOn => self.veg_started_on,
            DateField::FlowerStartedOn => self.flower_started_on,
            DateField::HarvestedOn => self.harvested_on,
            DateField::CureStartedOn => self.cure_started_on,
            DateField::PotentialHarvest => self.potential_harvest,
            DateField::ArchivedOn => self.archived_on,
            DateField::DeletedOn => self.deleted_on,
        }
    }

    pub fn set(&mut self, field: DateField, value: Option<NaiveDate>) {
        let slot = match field {
            DateField::StartedOn => &mut self.started_on,
            DateField::VegStartedOn => &mut self.veg_started_on,
            DateField::FlowerStartedOn => &mut self.flower_started_on,
            DateField::HarvestedOn => &mut self.harvested_on,
            DateField::CureStartedOn => &mut self.cure_started_on,
            DateField::PotentialHarvest => &mut self.potential_harvest,
            DateField::ArchivedOn => &mut self.archived_on,
            DateField::DeletedOn => &mut self.deleted_on,
        };
        *slot = value;
    }

    pub fn with(mut self, field: DateField, value: NaiveDate) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn is_set(&self, field: DateField) -> bool {
        self.get(field).is_some()
    }
}

fn require(
    dates: &DateSet,
    field: DateField,
    scope: impl Into<RuleScope>,
) -> Result<NaiveDate, ValidationError> {
    dates.get(field).ok_or(ValidationError::RequiredFor {
        field,
        scope: scope.into(),
    })
}

/// Cultivation dates keyed by stage: each variant carries exactly the
/// dates its stage requires, so a record holding one cannot be missing a
/// required date or carry one from a later stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageDates {
    Seedling {
        started_on: NaiveDate,
    },
    Veg {
        started_on: NaiveDate,
        veg_started_on: NaiveDate,
    },
    Flower {
        started_on: NaiveDate,
        veg_started_on: NaiveDate,
        flower_started_on: NaiveDate,
    },
    Harvested {
        started_on: NaiveDate,
        veg_started_on: NaiveDate,
        flower_started_on: NaiveDate,
        harvested_on: NaiveDate,
    },
    Cure {
        started_on: NaiveDate,
        veg_started_on: NaiveDate,
        flower_started_on: NaiveDate,
        harvested_on: NaiveDate,
        cure_started_on: NaiveDate,
    },
}

impl StageDates {
    pub fn seedling(started_on: NaiveDate) -> Self {
        StageDates::Seedling { started_on }
    }

    pub fn stage(&self) -> Stage {
        match self {
            StageDates::Seedling { .. } => Stage::Seedling,
            StageDates::Veg { .. } => Stage::Veg,
            StageDates::Flower { .. } => Stage::Flower,
            StageDates::Harvested { .. } => Stage::Harvested,
            StageDates::Cure { .. } => Stage::Cure,
        }
    }

    pub fn started_on(&self) -> NaiveDate {
        match *self {
            StageDates::Seedling { started_on }
            | StageDates::Veg { started_on, .. }
            | StageDates::Flower { started_on, .. }
            | StageDates::Harvested { started_on, .. }
            | StageDates::Cure { started_on, .. } => started_on,
        }
    }

    /// Reads the dates `stage` requires out of `dates`. Dates belonging to
    /// later stages are ignored here; rejecting them is the rule tables' job.
    pub fn from_date_set(stage: Stage, dates: &DateSet) -> Result<Self, ValidationError> {
        let started_on = require(dates, DateField::StartedOn, stage)?;
        if stage == Stage::Seedling {
            return Ok(StageDates::Seedling { started_on });
        }

        let veg_started_on = require(dates, DateField::VegStartedOn, stage)?;
        if stage == Stage::Veg {
            return Ok(StageDates::Veg {
                started_on,
                veg_started_on,
            });
        }

        let flower_started_on = require(dates, DateField::FlowerStartedOn, stage)?;
        if stage == Stage::Flower {
            return Ok(StageDates::Flower {
                started_on,
                veg_started_on,
                flower_started_on,
            });
        }

        let harvested_on = require(dates, DateField::HarvestedOn, stage)?;
        if stage == Stage::Harvested {
            return Ok(StageDates::Harvested {
                started_on,
                veg_started_on,
                flower_started_on,
                harvested_on,
            });
        }

        let cure_started_on = require(dates, DateField::CureStartedOn, stage)?;
        Ok(StageDates::Cure {
            started_on,
            veg_started_on,
            flower_started_on,
            harvested_on,
            cure_started_on,
        })
    }

    /// Writes this variant's dates into `dates`, clearing the other stage dates.
    pub fn write_into(&self, dates: &mut DateSet) {
        dates.started_on = Some(self.started_on());
        dates.veg_started_on = None;
        dates.flower_started_on = None;
        dates.harvested_on = None;
        dates.cure_started_on = None;

        match *self {
            StageDates::Seedling { .. } => {}
            StageDates::Veg { veg_started_on, .. } => {
                dates.veg_started_on = Some(veg_started_on);
            }
            StageDates::Flower {
                veg_started_on,
                flower_started_on,
                ..
            } => {
                dates.veg_started_on = Some(veg_started_on);
                dates.flower_started_on = Some(flower_started_on);
            }
            StageDates::Harvested {
                veg_started_on,
                flower_started_on,
                harvested_on,
                ..
            } => {
                dates.veg_started_on = Some(veg_started_on);
                dates.flower_started_on = Some(flower_started_on);
                dates.harvested_on = Some(harvested_on);
            }
            StageDates::Cure {
                veg_started_on,
                flower_started_on,
                harvested_on,
                cure_started_on,
                ..
            } => {
                dates.veg_started_on = Some(veg_started_on);
                dates.flower_started_on = Some(flower_started_on);
                dates.harvested_on = Some(harvested_on);
                dates.cure_started_on = Some(cure_started_on);
            }
        }
    }

    pub fn to_date_set(&self) -> DateSet {
        let mut dates = DateSet::default();
        self.write_into(&mut dates);
        dates
    }
}

/// Status dates keyed by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusDates {
    #[default]
    Active,
    Inactive {
        deleted_on: NaiveDate,
    },
    Archived {
        archived_on: NaiveDate,
    },
}

impl StatusDates {
    pub fn status(&self) -> Status {
        match self {
            StatusDates::Active => Status::Active,
            StatusDates::Inactive { .. } => Status::Inactive,
            StatusDates::Archived { .. } => Status::Archived,
        }
    }

    pub fn from_date_set(status: Status, dates: &DateSet) -> Result<Self, ValidationError> {
        match status {
            Status::Active => Ok(StatusDates::Active),
            Status::Inactive => Ok(StatusDates::Inactive {
                deleted_on: require(dates, DateField::DeletedOn, status)?,
            }),
            Status::Archived => Ok(StatusDates::Archived {
                archived_on: require(dates, DateField::ArchivedOn, status)?,
            }),
        }
    }

    pub fn write_into(&self, dates: &mut DateSet) {
        dates.archived_on = None;
        dates.deleted_on = None;
        match *self {
            StatusDates::Active => {}
            StatusDates::Inactive { deleted_on } => dates.deleted_on = Some(deleted_on),
            StatusDates::Archived { archived_on } => dates.archived_on = Some(archived_on),
        }
    }
}
