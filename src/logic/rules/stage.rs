use super::{DateRuleTable, FieldRules};
use crate::error::ValidationError;
use crate::models::DateField::{
    CureStartedOn, FlowerStartedOn, HarvestedOn, PotentialHarvest, StartedOn, VegStartedOn,
};
use crate::models::{DateField, DateSet, Stage};
use chrono::NaiveDate;

/// Cumulative: each stage requires every earlier stage's entry date plus its own.
/// Entry dates are listed before `potentialHarvest` so a missing anchor is
/// reported by name rather than as a missing projection.
const STAGE_RULES: &[(Stage, FieldRules)] = &[
    (
        Stage::Seedling,
        FieldRules {
            required: &[StartedOn, PotentialHarvest],
            forbidden: &[VegStartedOn, FlowerStartedOn, HarvestedOn, CureStartedOn],
        },
    ),
    (
        Stage::Veg,
        FieldRules {
            required: &[StartedOn, VegStartedOn, PotentialHarvest],
            forbidden: &[FlowerStartedOn, HarvestedOn, CureStartedOn],
        },
    ),
    (
        Stage::Flower,
        FieldRules {
            required: &[StartedOn, VegStartedOn, FlowerStartedOn, PotentialHarvest],
            forbidden: &[HarvestedOn, CureStartedOn],
        },
    ),
    (
        Stage::Harvested,
        FieldRules {
            required: &[StartedOn, VegStartedOn, FlowerStartedOn, HarvestedOn],
            forbidden: &[PotentialHarvest, CureStartedOn],
        },
    ),
    (
        Stage::Cure,
        FieldRules {
            required: &[
                StartedOn,
                VegStartedOn,
                FlowerStartedOn,
                HarvestedOn,
                CureStartedOn,
            ],
            forbidden: &[PotentialHarvest],
        },
    ),
];

/// Stage congruency: which cultivation dates each growth stage demands.
pub struct StageRules;

impl StageRules {
    pub fn validate_stage_dates(stage: Stage, dates: &DateSet) -> Result<(), ValidationError> {
        <Self as DateRuleTable>::validate(stage, dates)
    }

    /// Stage entry dates never go backwards; the same day is fine.
    pub fn validate_order(dates: &DateSet) -> Result<(), ValidationError> {
        let mut latest: Option<(DateField, NaiveDate)> = None;
        for stage in Stage::all() {
            let field = stage.entry_field();
            let Some(date) = dates.get(field) else {
                continue;
            };
            if let Some((earlier, before)) = latest {
                if date < before {
                    return Err(ValidationError::OutOfOrder { field, earlier });
                }
            }
            latest = Some((field, date));
        }
        Ok(())
    }
}

impl DateRuleTable for StageRules {
    type Key = Stage;

    fn table() -> &'static [(Stage, FieldRules)] {
        STAGE_RULES
    }

    fn parse_key(name: &str) -> Result<Stage, ValidationError> {
        Stage::from_str(name).ok_or_else(|| Self::unknown_key(name))
    }

    fn unknown_key(name: &str) -> ValidationError {
        ValidationError::UnknownStage(name.to_string())
    }
}
