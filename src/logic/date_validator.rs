use super::calculations::parse_date;
use super::clock::Clock;
use crate::error::ValidationError;
use crate::models::DateField;
use chrono::NaiveDate;
use serde_json::Value;

/// Validates one date-bearing field against a fixed "today".
///
/// Build one per operation so every check in that pass shares the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValidator {
    today: NaiveDate,
}

impl DateValidator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Validate a raw (loosely typed) value.
    ///
    /// `None` means the key was not supplied; JSON `null` is treated the same
    /// way. Strings are parsed; any other JSON type is an invalid date.
    pub fn validate_value(
        &self,
        field: DateField,
        raw: Option<&Value>,
        required: bool,
    ) -> Result<Option<NaiveDate>, ValidationError> {
        let parsed = Self::parse_value(field, raw)?;
        self.validate_date(field, parsed, required)
    }

    /// Validate an already-typed date.
    pub fn validate_date(
        &self,
        field: DateField,
        value: Option<NaiveDate>,
        required: bool,
    ) -> Result<Option<NaiveDate>, ValidationError> {
        match value {
            None if required => Err(ValidationError::Required(field.as_str().to_string())),
            None => Ok(None),
            Some(date) => self.check_not_future(field, date).map(Some),
        }
    }

    pub fn check_not_future(
        &self,
        field: DateField,
        date: NaiveDate,
    ) -> Result<NaiveDate, ValidationError> {
        if !field.is_derived() && date > self.today {
            return Err(ValidationError::FutureDate(field));
        }
        Ok(date)
    }

    /// Format-only parse, with no required or future checks.
    pub fn parse_value(
        field: DateField,
        raw: Option<&Value>,
    ) -> Result<Option<NaiveDate>, ValidationError> {
        match raw {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => parse_date(s)
                .map(Some)
                .ok_or(ValidationError::InvalidDate(field)),
            Some(_) => Err(ValidationError::InvalidDate(field)),
        }
    }
}
