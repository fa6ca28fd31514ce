use super::calculations::add_weeks;
use crate::error::ValidationError;
use crate::models::{DateField, DateSet, Stage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Expected length of each pre-harvest stage, in weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageWeeks {
    pub seedling_weeks: u32,
    pub veg_weeks: u32,
    pub flower_weeks: u32,
}

impl Default for StageWeeks {
    fn default() -> Self {
        Self {
            seedling_weeks: 1,
            veg_weeks: 4,
            flower_weeks: 8,
        }
    }
}

/// What to do when asked to project for a stage name nobody recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionPolicy {
    /// No projection; the caller sees an absent date.
    #[default]
    Lenient,
    /// Fail with `ProjectionUnavailable`.
    Strict,
}

/// Computes `potentialHarvest` from the current stage's entry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HarvestProjector {
    weeks: StageWeeks,
    policy: ProjectionPolicy,
}

impl HarvestProjector {
    pub fn new(weeks: StageWeeks) -> Self {
        Self {
            weeks,
            policy: ProjectionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ProjectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn weeks(&self) -> StageWeeks {
        self.weeks
    }

    pub fn policy(&self) -> ProjectionPolicy {
        self.policy
    }

    /// Weeks left from entering `stage` until harvest, or `None` once
    /// harvested. Fails when the configured lengths do not fit in a `u32`.
    pub fn weeks_remaining(&self, stage: Stage) -> Result<Option<u32>, ValidationError> {
        let StageWeeks {
            seedling_weeks,
            veg_weeks,
            flower_weeks,
        } = self.weeks;

        let weeks = match stage {
            Stage::Seedling => seedling_weeks
                .checked_add(veg_weeks)
                .and_then(|w| w.checked_add(flower_weeks)),
            Stage::Veg => veg_weeks.checked_add(flower_weeks),
            Stage::Flower => Some(flower_weeks),
            Stage::Harvested | Stage::Cure => return Ok(None),
        };
        weeks
            .map(Some)
            .ok_or(ValidationError::DateOutOfRange(DateField::PotentialHarvest))
    }

    /// Project the harvest date for `stage`.
    ///
    /// Returns `Ok(None)` after harvest, and also when the stage's entry date
    /// is missing (the rule tables report that omission by name).
    pub fn project(
        &self,
        stage: Stage,
        dates: &DateSet,
    ) -> Result<Option<NaiveDate>, ValidationError> {
        let Some(weeks) = self.weeks_remaining(stage)? else {
            return Ok(None);
        };
        let Some(anchor) = dates.get(stage.entry_field()) else {
            return Ok(None);
        };

        add_weeks(anchor, weeks)
            .map(Some)
            .ok_or(ValidationError::DateOutOfRange(DateField::PotentialHarvest))
    }

    /// Project for a stage given by name, applying the configured policy to
    /// names that are not stages.
    pub fn project_named(
        &self,
        stage: &str,
        dates: &DateSet,
    ) -> Result<Option<NaiveDate>, ValidationError> {
        match Stage::from_str(stage) {
            Some(stage) => self.project(stage, dates),
            None => match self.policy {
                ProjectionPolicy::Lenient => {
                    tracing::debug!(stage = %stage, "No harvest projection for unknown stage");
                    Ok(None)
                }
                ProjectionPolicy::Strict => {
                    Err(ValidationError::ProjectionUnavailable(stage.to_string()))
                }
            },
        }
    }
}
