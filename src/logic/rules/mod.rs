pub mod engine;
pub mod stage;
pub mod status;

pub use engine::RulesEngine;
pub use stage::StageRules;
pub use status::StatusRules;

use crate::error::ValidationError;
use crate::models::{DateField, DateSet, RuleScope};

/// Which dates a stage or status demands and which it forbids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    pub required: &'static [DateField],
    pub forbidden: &'static [DateField],
}

impl FieldRules {
    /// Required dates are checked first, in table order, then forbidden ones.
    pub fn check(&self, scope: RuleScope, dates: &DateSet) -> Result<(), ValidationError> {
        match self.violations(scope, dates).next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn violations<'a>(
        &'a self,
        scope: RuleScope,
        dates: &'a DateSet,
    ) -> impl Iterator<Item = ValidationError> + 'a {
        let missing = self
            .required
            .iter()
            .filter(move |f| !dates.is_set(**f))
            .map(move |f| ValidationError::RequiredFor { field: *f, scope });
        let present = self
            .forbidden
            .iter()
            .filter(move |f| dates.is_set(**f))
            .map(move |f| ValidationError::ForbiddenFor { field: *f, scope });
        missing.chain(present)
    }

    /// True when the table says nothing about `field`.
    pub fn is_unconstrained(&self, field: DateField) -> bool {
        !self.required.contains(&field) && !self.forbidden.contains(&field)
    }
}

/// A declarative table of date rules keyed by a stage-like enum.
pub trait DateRuleTable {
    type Key: Copy + PartialEq + Into<RuleScope> + 'static;

    /// Every key paired with its rules.
    fn table() -> &'static [(Self::Key, FieldRules)];

    /// Resolve a key from its textual name.
    fn parse_key(name: &str) -> Result<Self::Key, ValidationError>;

    fn unknown_key(name: &str) -> ValidationError;

    fn rules_for(key: Self::Key) -> Option<&'static FieldRules> {
        Self::table()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, rules)| rules)
    }

    fn validate(key: Self::Key, dates: &DateSet) -> Result<(), ValidationError> {
        let scope: RuleScope = key.into();
        let rules = Self::rules_for(key).ok_or_else(|| Self::unknown_key(&scope.to_string()))?;
        rules.check(scope, dates)
    }

    fn validate_named(name: &str, dates: &DateSet) -> Result<(), ValidationError> {
        Self::validate(Self::parse_key(name)?, dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Stage, Status};

    fn keys<T: DateRuleTable>() -> Vec<T::Key> {
        T::table().iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn every_key_has_rules() {
        assert_eq!(keys::<StageRules>(), Stage::all().to_vec());
        assert_eq!(keys::<StatusRules>(), Status::all().to_vec());
        for stage in Stage::all() {
            assert!(StageRules::rules_for(*stage).is_some());
        }
        for status in Status::all() {
            assert!(StatusRules::rules_for(*status).is_some());
        }
    }

    #[test]
    fn named_lookup_goes_through_the_table() {
        let dates = DateSet::default();
        assert_eq!(
            StatusRules::validate_named("active", &dates),
            Ok(())
        );
        assert_eq!(
            StageRules::validate_named("harvest", &dates),
            Err(ValidationError::UnknownStage("harvest".into()))
        );
    }
}
