use super::{DateRuleTable, FieldRules};
use crate::error::ValidationError;
use crate::models::DateField::{ArchivedOn, DeletedOn};
use crate::models::{DateSet, Status};

const STATUS_RULES: &[(Status, FieldRules)] = &[
    (
        Status::Active,
        FieldRules {
            required: &[],
            forbidden: &[ArchivedOn, DeletedOn],
        },
    ),
    (
        Status::Inactive,
        FieldRules {
            required: &[DeletedOn],
            forbidden: &[ArchivedOn],
        },
    ),
    (
        Status::Archived,
        FieldRules {
            required: &[ArchivedOn],
            forbidden: &[DeletedOn],
        },
    ),
];

/// Status congruency: archived records carry `archivedOn`, deleted ones
/// carry `deletedOn`, active ones neither.
pub struct StatusRules;

impl StatusRules {
    pub fn validate_status_dates(status: Status, dates: &DateSet) -> Result<(), ValidationError> {
        <Self as DateRuleTable>::validate(status, dates)
    }
}

impl DateRuleTable for StatusRules {
    type Key = Status;

    fn table() -> &'static [(Status, FieldRules)] {
        STATUS_RULES
    }

    fn parse_key(name: &str) -> Result<Status, ValidationError> {
        Status::from_str(name).ok_or_else(|| Self::unknown_key(name))
    }

    fn unknown_key(name: &str) -> ValidationError {
        ValidationError::UnknownStatus(name.to_string())
    }
}
