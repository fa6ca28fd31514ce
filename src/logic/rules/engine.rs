use super::{DateRuleTable, StageRules, StatusRules};
use crate::error::ValidationError;
use crate::models::{DateSet, Stage, Status};

/// Runs every record-wide congruency check against one set of dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Stage rules, then status rules, then stage date order; the first
    /// violation wins.
    pub fn validate(
        &self,
        stage: Stage,
        status: Status,
        dates: &DateSet,
    ) -> Result<(), ValidationError> {
        StageRules::validate_stage_dates(stage, dates)?;
        StatusRules::validate_status_dates(status, dates)?;
        StageRules::validate_order(dates)
    }

    pub fn validate_named(
        &self,
        stage: &str,
        status: &str,
        dates: &DateSet,
    ) -> Result<(), ValidationError> {
        let stage = StageRules::parse_key(stage)?;
        let status = StatusRules::parse_key(status)?;
        self.validate(stage, status, dates)
    }

    /// Every violation instead of just the first, for reporting.
    pub fn violations(&self, stage: Stage, status: Status, dates: &DateSet) -> Vec<ValidationError> {
        let mut found = Vec::new();

        if let Some(rules) = StageRules::rules_for(stage) {
            found.extend(rules.violations(stage.into(), dates));
        }
        if let Some(rules) = StatusRules::rules_for(status) {
            found.extend(rules.violations(status.into(), dates));
        }
        if let Err(err) = StageRules::validate_order(dates) {
            found.push(err);
        }

        found
    }
}
