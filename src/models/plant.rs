use super::{DateField, DateSet, PlantDocument, Stage, StageDates, Status, StatusDates};
use crate::error::ValidationError;
use crate::logic::calculations::days_between;
use crate::logic::clock::{Clock, SystemClock};
use crate::logic::date_validator::DateValidator;
use crate::logic::projection::HarvestProjector;
use crate::logic::rules::RulesEngine;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 255;

/// Where a record gets "today" from and how it projects its harvest date.
#[derive(Debug, Clone)]
pub struct PlantContext {
    clock: Arc<dyn Clock>,
    projector: HarvestProjector,
}

impl PlantContext {
    pub fn new(clock: Arc<dyn Clock>, projector: HarvestProjector) -> Self {
        Self { clock, projector }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn projector(&self) -> &HarvestProjector {
        &self.projector
    }

    /// A validator pinned to the clock's current date.
    pub fn validator(&self) -> DateValidator {
        DateValidator::from_clock(self.clock.as_ref())
    }
}

impl Default for PlantContext {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), HarvestProjector::default())
    }
}

/// A plant whose dates always agree with its stage and status.
///
/// Stage dates and status dates are held as sum types, so the only way to
/// obtain a `PlantRecord` is through a constructor or transition that has
/// already run every check. Failed mutations leave the record untouched.
#[derive(Debug, Clone)]
pub struct PlantRecord {
    name: String,
    stage_dates: StageDates,
    status_dates: StatusDates,
    potential_harvest: Option<NaiveDate>,
    ctx: PlantContext,
}

impl PartialEq for PlantRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.stage_dates == other.stage_dates
            && self.status_dates == other.status_dates
            && self.potential_harvest == other.potential_harvest
    }
}

impl Eq for PlantRecord {}

impl Serialize for PlantRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl PlantRecord {
    /// Build from already-typed stage and status dates.
    pub fn new(
        name: &str,
        stage_dates: StageDates,
        status_dates: StatusDates,
        ctx: PlantContext,
    ) -> Result<Self, ValidationError> {
        let validator = ctx.validator();
        let name = validate_name(name)?;

        let mut dates = DateSet::default();
        stage_dates.write_into(&mut dates);
        status_dates.write_into(&mut dates);

        Self::assemble(
            name,
            stage_dates.stage(),
            status_dates.status(),
            dates,
            &validator,
            ctx,
        )
    }

    /// An active seedling started today.
    pub fn seedling(name: &str, ctx: PlantContext) -> Result<Self, ValidationError> {
        let validator = ctx.validator();
        let name = validate_name(name)?;
        let dates = DateSet::default().with(DateField::StartedOn, validator.today());

        Self::assemble(name, Stage::Seedling, Status::Active, dates, &validator, ctx)
    }

    /// Build from a loosely typed JSON object.
    ///
    /// `status` defaults to active, `stage` to seedling and a missing
    /// `startedOn` to today. A supplied `potentialHarvest` is only checked
    /// for format; the projector's value takes precedence.
    pub fn from_value(input: &Value, ctx: PlantContext) -> Result<Self, ValidationError> {
        let Value::Object(map) = input else {
            return Err(ValidationError::TypeMismatch("invalid plant object".into()));
        };
        let validator = ctx.validator();

        let name = name_from_value(map.get("name"))?;
        let status = enum_field(map, "status", Status::from_str, ValidationError::UnknownStatus)?
            .unwrap_or_default();
        let stage = enum_field(map, "stage", Stage::from_str, ValidationError::UnknownStage)?
            .unwrap_or(Stage::Seedling);

        let mut dates = DateSet::default();
        for &field in DateField::all() {
            let raw = map.get(field.as_str());
            let value = match field {
                DateField::StartedOn if raw.is_none() => Some(validator.today()),
                DateField::StartedOn => validator.validate_value(field, raw, true)?,
                DateField::PotentialHarvest => DateValidator::parse_value(field, raw)?,
                _ => validator.validate_value(field, raw, false)?,
            };
            dates.set(field, value);
        }

        Self::assemble(name, stage, status, dates, &validator, ctx)
    }

    pub fn from_document(doc: &PlantDocument, ctx: PlantContext) -> Result<Self, ValidationError> {
        let validator = ctx.validator();
        let name = validate_name(&doc.name)?;
        validator.validate_date(DateField::StartedOn, doc.dates.started_on, true)?;

        Self::assemble(name, doc.stage, doc.status, doc.dates, &validator, ctx)
    }

    pub fn to_document(&self) -> PlantDocument {
        PlantDocument {
            name: self.name.clone(),
            status: self.status(),
            stage: self.stage(),
            dates: self.dates(),
        }
    }

    /// Single choke point every constructor and transition goes through.
    fn assemble(
        name: String,
        stage: Stage,
        status: Status,
        mut dates: DateSet,
        validator: &DateValidator,
        ctx: PlantContext,
    ) -> Result<Self, ValidationError> {
        for &field in DateField::all() {
            if let Some(date) = dates.get(field) {
                validator.check_not_future(field, date)?;
            }
        }

        if let Some(projected) = ctx.projector.project(stage, &dates)? {
            if let Some(supplied) = dates.potential_harvest.filter(|d| *d != projected) {
                tracing::debug!(%supplied, %projected, "Replacing supplied harvest projection");
            }
            dates.potential_harvest = Some(projected);
        }

        RulesEngine::new().validate(stage, status, &dates)?;

        Ok(Self {
            name,
            stage_dates: StageDates::from_date_set(stage, &dates)?,
            status_dates: StatusDates::from_date_set(status, &dates)?,
            potential_harvest: dates.potential_harvest,
            ctx,
        })
    }

    /// Re-assemble with new stage dates, keeping name and status.
    fn rebuild(
        &self,
        stage: Stage,
        mut dates: DateSet,
        validator: &DateValidator,
    ) -> Result<Self, ValidationError> {
        dates.potential_harvest = None;
        Self::assemble(
            self.name.clone(),
            stage,
            self.status(),
            dates,
            validator,
            self.ctx.clone(),
        )
    }

    // Getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage_dates.stage()
    }

    pub fn status(&self) -> Status {
        self.status_dates.status()
    }

    pub fn stage_dates(&self) -> StageDates {
        self.stage_dates
    }

    pub fn status_dates(&self) -> StatusDates {
        self.status_dates
    }

    pub fn context(&self) -> &PlantContext {
        &self.ctx
    }

    /// Every date as a flat set.
    pub fn dates(&self) -> DateSet {
        let mut dates = DateSet::default();
        self.stage_dates.write_into(&mut dates);
        self.status_dates.write_into(&mut dates);
        dates.potential_harvest = self.potential_harvest;
        dates
    }

    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        self.dates().get(field)
    }

    pub fn started_on(&self) -> NaiveDate {
        self.stage_dates.started_on()
    }

    pub fn veg_started_on(&self) -> Option<NaiveDate> {
        self.date(DateField::VegStartedOn)
    }

    pub fn flower_started_on(&self) -> Option<NaiveDate> {
        self.date(DateField::FlowerStartedOn)
    }

    pub fn harvested_on(&self) -> Option<NaiveDate> {
        self.date(DateField::HarvestedOn)
    }

    pub fn cure_started_on(&self) -> Option<NaiveDate> {
        self.date(DateField::CureStartedOn)
    }

    pub fn potential_harvest(&self) -> Option<NaiveDate> {
        self.potential_harvest
    }

    pub fn archived_on(&self) -> Option<NaiveDate> {
        match self.status_dates {
            StatusDates::Archived { archived_on } => Some(archived_on),
            _ => None,
        }
    }

    pub fn deleted_on(&self) -> Option<NaiveDate> {
        match self.status_dates {
            StatusDates::Inactive { deleted_on } => Some(deleted_on),
            _ => None,
        }
    }

    /// Days from today until the projected harvest; negative when overdue.
    pub fn days_until_harvest(&self) -> Option<i64> {
        self.potential_harvest
            .map(|harvest| days_between(self.ctx.today(), harvest))
    }

    // Setters

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = validate_name(name)?;
        Ok(())
    }

    /// Change the stage without touching any date. Fails unless the current
    /// dates already satisfy `stage`; see [`PlantRecord::change_stage`].
    pub fn set_stage(&mut self, stage: Stage) -> Result<(), ValidationError> {
        let validator = self.ctx.validator();
        *self = self.rebuild(stage, self.dates(), &validator)?;
        Ok(())
    }

    pub fn set_date(
        &mut self,
        field: DateField,
        value: Option<NaiveDate>,
    ) -> Result<(), ValidationError> {
        if field.is_derived() {
            return Err(ValidationError::DerivedField(field));
        }
        let validator = self.ctx.validator();
        let value = validator.validate_date(field, value, field == DateField::StartedOn)?;

        let mut dates = self.dates();
        dates.set(field, value);
        *self = self.rebuild(self.stage(), dates, &validator)?;
        Ok(())
    }

    /// Like [`PlantRecord::set_date`] but parses a raw JSON value first.
    pub fn set_date_value(&mut self, field: DateField, raw: &Value) -> Result<(), ValidationError> {
        if field.is_derived() {
            return Err(ValidationError::DerivedField(field));
        }
        let value = DateValidator::parse_value(field, Some(raw))?;
        self.set_date(field, value)
    }

    pub fn set_started_on(&mut self, date: NaiveDate) -> Result<(), ValidationError> {
        self.set_date(DateField::StartedOn, Some(date))
    }

    pub fn set_veg_started_on(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.set_date(DateField::VegStartedOn, date)
    }

    pub fn set_flower_started_on(
        &mut self,
        date: Option<NaiveDate>,
    ) -> Result<(), ValidationError> {
        self.set_date(DateField::FlowerStartedOn, date)
    }

    pub fn set_harvested_on(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.set_date(DateField::HarvestedOn, date)
    }

    pub fn set_cure_started_on(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.set_date(DateField::CureStartedOn, date)
    }

    pub fn set_archived_on(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.set_date(DateField::ArchivedOn, date)
    }

    pub fn set_deleted_on(&mut self, date: Option<NaiveDate>) -> Result<(), ValidationError> {
        self.set_date(DateField::DeletedOn, date)
    }

    // Transitions

    /// Move to `stage`, stamping its entry date with `on`, else the date it
    /// already has, else today. Dates of every later stage are cleared.
    pub fn change_stage(&mut self, stage: Stage, on: Option<NaiveDate>) -> Result<(), ValidationError> {
        let validator = self.ctx.validator();
        let mut dates = self.dates();
        enter_stage(&mut dates, stage, on, &validator)?;
        *self = self.rebuild(stage, dates, &validator)?;
        Ok(())
    }

    /// Apply a partial plain object and return the resulting record.
    ///
    /// `archivedOn` and `deletedOn` are owned by the lifecycle operations and
    /// ignored here; a `status` value is routed to the matching operation.
    pub fn patched(&self, patch: &Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = patch else {
            return Err(ValidationError::TypeMismatch("invalid plant object".into()));
        };
        let validator = self.ctx.validator();

        let name = match map.get("name") {
            None => self.name.clone(),
            raw => name_from_value(raw)?,
        };
        let stage = enum_field(map, "stage", Stage::from_str, ValidationError::UnknownStage)?
            .unwrap_or_else(|| self.stage());
        let status = enum_field(map, "status", Status::from_str, ValidationError::UnknownStatus)?;

        let mut dates = self.dates();
        dates.potential_harvest = None;
        for &field in DateField::all() {
            if matches!(field, DateField::ArchivedOn | DateField::DeletedOn) {
                continue;
            }
            let Some(raw) = map.get(field.as_str()) else {
                continue;
            };
            let value = if field.is_derived() {
                DateValidator::parse_value(field, Some(raw))?
            } else {
                validator.validate_value(field, Some(raw), field == DateField::StartedOn)?
            };
            dates.set(field, value);
        }

        if stage != self.stage() {
            enter_stage(&mut dates, stage, None, &validator)?;
        }

        let mut next = Self::assemble(
            name,
            stage,
            self.status(),
            dates,
            &validator,
            self.ctx.clone(),
        )?;
        if let Some(status) = status {
            next.transition_to(status, validator.today());
        }
        Ok(next)
    }

    /// Route a target status to the lifecycle operation that reaches it.
    /// Returns whether anything changed.
    pub fn set_status(&mut self, status: Status) -> bool {
        let today = self.ctx.today();
        self.transition_to(status, today)
    }

    fn transition_to(&mut self, status: Status, today: NaiveDate) -> bool {
        match status {
            Status::Inactive => self.delete_on(today),
            Status::Archived => self.archive_on(today),
            Status::Active => self.undelete() | self.unarchive(),
        }
    }

    // Lifecycle

    /// Mark the record deleted. Returns `false` if it already was.
    pub fn delete(&mut self) -> bool {
        let today = self.ctx.today();
        self.delete_on(today)
    }

    fn delete_on(&mut self, today: NaiveDate) -> bool {
        if let StatusDates::Inactive { .. } = self.status_dates {
            tracing::debug!(plant = %self.name, "Already deleted");
            return false;
        }
        self.status_dates = StatusDates::Inactive { deleted_on: today };
        true
    }

    pub fn undelete(&mut self) -> bool {
        if let StatusDates::Inactive { .. } = self.status_dates {
            self.status_dates = StatusDates::Active;
            return true;
        }
        tracing::debug!(plant = %self.name, status = %self.status(), "Undelete skipped");
        false
    }

    /// Archive an active record. Deleted records cannot be archived.
    pub fn archive(&mut self) -> bool {
        let today = self.ctx.today();
        self.archive_on(today)
    }

    fn archive_on(&mut self, today: NaiveDate) -> bool {
        if let StatusDates::Active = self.status_dates {
            self.status_dates = StatusDates::Archived { archived_on: today };
            return true;
        }
        tracing::debug!(plant = %self.name, status = %self.status(), "Archive skipped");
        false
    }

    pub fn unarchive(&mut self) -> bool {
        if let StatusDates::Archived { .. } = self.status_dates {
            self.status_dates = StatusDates::Active;
            return true;
        }
        tracing::debug!(plant = %self.name, status = %self.status(), "Unarchive skipped");
        false
    }
}

fn enter_stage(
    dates: &mut DateSet,
    stage: Stage,
    on: Option<NaiveDate>,
    validator: &DateValidator,
) -> Result<(), ValidationError> {
    let entry = stage.entry_field();
    let date = match on {
        Some(date) => validator.check_not_future(entry, date)?,
        None => dates.get(entry).unwrap_or(validator.today()),
    };
    dates.set(entry, Some(date));

    for later in Stage::all().iter().filter(|s| **s > stage) {
        dates.set(later.entry_field(), None);
    }
    Ok(())
}

/// ASCII punctuation minus the math and currency symbols, plus the general
/// punctuation block (dashes, curly quotes, ellipsis).
fn is_punctuation(c: char) -> bool {
    (c.is_ascii_punctuation() && !matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~'))
        || ('\u{2010}'..='\u{2027}').contains(&c)
        || matches!(c, '¡' | '¿' | '«' | '»' | '·')
}

/// Trim a plant name and check its length and characters: letters,
/// numbers, punctuation and spaces.
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Required("name".into()));
    }

    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        return Err(ValidationError::TooShort {
            field: "name",
            min: NAME_MIN_LEN,
        });
    }
    if len > NAME_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "name",
            max: NAME_MAX_LEN,
        });
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || is_punctuation(c))
    {
        return Err(ValidationError::InvalidCharacters("name"));
    }
    Ok(name.to_string())
}

fn name_from_value(raw: Option<&Value>) -> Result<String, ValidationError> {
    match raw {
        None | Some(Value::Null) => Err(ValidationError::Required("name".into())),
        Some(Value::String(s)) => validate_name(s),
        Some(_) => Err(ValidationError::TypeMismatch("name must be a string".into())),
    }
}

fn enum_field<T>(
    map: &Map<String, Value>,
    key: &str,
    parse: fn(&str) -> Option<T>,
    unknown: fn(String) -> ValidationError,
) -> Result<Option<T>, ValidationError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse(s).map(Some).ok_or_else(|| unknown(s.clone())),
        Some(_) => Err(ValidationError::TypeMismatch(format!("{key} must be a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clock::FixedClock;
    use crate::logic::projection::{ProjectionPolicy, StageWeeks};
    use proptest::prelude::*;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ctx_on(today: &str) -> PlantContext {
        PlantContext::new(
            Arc::new(FixedClock(d(today))),
            HarvestProjector::new(StageWeeks::default()),
        )
    }

    fn ctx() -> PlantContext {
        ctx_on("2024-06-15")
    }

    fn build(input: Value) -> Result<PlantRecord, ValidationError> {
        PlantRecord::from_value(&input, ctx())
    }

    fn err(input: Value) -> String {
        build(input).unwrap_err().to_string()
    }

    fn flowering() -> PlantRecord {
        build(json!({
            "name": "Blue Dream",
            "stage": "flower",
            "startedOn": "2024-04-01",
            "vegStartedOn": "2024-04-08",
            "flowerStartedOn": "2024-05-06",
        }))
        .unwrap()
    }

    #[test]
    fn defaults_for_minimal_input() {
        let plant = build(json!({ "name": "Bob" })).unwrap();
        assert_eq!(plant.name(), "Bob");
        assert_eq!(plant.status(), Status::Active);
        assert_eq!(plant.stage(), Stage::Seedling);
        assert_eq!(plant.started_on(), d("2024-06-15"));
        assert_eq!(plant.potential_harvest(), Some(d("2024-09-14")));
        assert_eq!(plant.veg_started_on(), None);
        assert_eq!(plant.flower_started_on(), None);
        assert_eq!(plant.harvested_on(), None);
        assert_eq!(plant.cure_started_on(), None);
        assert_eq!(plant.archived_on(), None);
        assert_eq!(plant.deleted_on(), None);
    }

    #[test]
    fn seedling_constructor_matches_loose_defaults() {
        let typed = PlantRecord::seedling("Bob", ctx()).unwrap();
        assert_eq!(typed, build(json!({ "name": "Bob" })).unwrap());
    }

    #[test]
    fn name_allows_letters_numbers_and_punctuation() {
        for ok in ["Blue Dream #3", "Mr. Nice (F1)", "Señorita", "Girl Scout Cookies – pheno 2"] {
            assert_eq!(build(json!({ "name": ok })).unwrap().name(), ok);
        }
        for bad in ["Blue\tDream", "Dream 🌱", "a+b=c", "Kush $$$"] {
            assert_eq!(
                err(json!({ "name": bad })),
                "name must only contain letters, numbers, and punctuation"
            );
        }
    }

    #[test]
    fn name_is_trimmed_and_length_checked() {
        assert_eq!(build(json!({ "name": "  Bob  " })).unwrap().name(), "Bob");
        assert_eq!(err(json!({ "name": "A" })), "name must be at least 3 characters");
        assert_eq!(err(json!({ "name": "   ab  " })), "name must be at least 3 characters");
        assert_eq!(err(json!({ "name": "" })), "name is required");
        assert_eq!(err(json!({})), "name is required");
        assert_eq!(err(json!({ "name": true })), "name must be a string");
        assert_eq!(
            err(json!({ "name": "x".repeat(256) })),
            "name must be at most 255 characters"
        );
    }

    #[test]
    fn rejects_non_objects() {
        for input in [json!("Bob"), json!(null), json!([{"name": "Bob"}]), json!(7)] {
            assert_eq!(
                build(input).unwrap_err(),
                ValidationError::TypeMismatch("invalid plant object".into())
            );
        }
    }

    #[test]
    fn rejects_unknown_enum_values() {
        assert_eq!(
            err(json!({ "name": "Bob", "stage": "harvest" })),
            "unknown plant stage: harvest"
        );
        assert_eq!(
            err(json!({ "name": "Bob", "status": "deleted" })),
            "unknown plant status: deleted"
        );
        assert_eq!(
            err(json!({ "name": "Bob", "stage": 3 })),
            "stage must be a string"
        );
    }

    #[test]
    fn stage_congruency_is_enforced() {
        assert_eq!(
            err(json!({ "name": "Bob", "stage": "veg" })),
            "vegStartedOn is required for stage veg."
        );
        assert_eq!(
            err(json!({ "name": "Bob", "vegStartedOn": "2024-06-01" })),
            "vegStartedOn must be null for stage seedling."
        );
        assert_eq!(
            err(json!({
                "name": "Bob",
                "stage": "flower",
                "vegStartedOn": "2024-06-01",
                "flowerStartedOn": "2024-06-02",
                "cureStartedOn": "2024-06-03",
            })),
            "cureStartedOn must be null for stage flower."
        );
    }

    #[test]
    fn status_congruency_is_enforced() {
        assert_eq!(
            err(json!({ "name": "Bob", "status": "archived" })),
            "archivedOn is required for status archived."
        );
        assert_eq!(
            err(json!({ "name": "Bob", "deletedOn": "2024-06-01" })),
            "deletedOn must be null for status active."
        );
        assert_eq!(
            err(json!({
                "name": "Bob",
                "status": "inactive",
                "deletedOn": "2024-06-01",
                "archivedOn": "2024-06-01",
            })),
            "archivedOn must be null for status inactive."
        );

        let archived = build(json!({
            "name": "Bob",
            "status": "archived",
            "archivedOn": "2024-06-10",
        }))
        .unwrap();
        assert_eq!(archived.archived_on(), Some(d("2024-06-10")));
    }

    #[test]
    fn future_dates_rejected_and_today_accepted() {
        assert_eq!(
            err(json!({ "name": "Bob", "startedOn": "2024-06-16" })),
            "startedOn date cannot be in the future"
        );
        assert!(build(json!({ "name": "Bob", "startedOn": "2024-06-15" })).is_ok());
    }

    #[test]
    fn explicit_null_started_on_is_required() {
        assert_eq!(
            err(json!({ "name": "Bob", "startedOn": null })),
            "startedOn is required"
        );
        assert_eq!(
            err(json!({ "name": "Bob", "startedOn": "soon" })),
            "invalid startedOn date"
        );
    }

    #[test]
    fn projection_follows_current_stage() {
        let veg = build(json!({
            "name": "Bob",
            "stage": "veg",
            "startedOn": "2024-05-01",
            "vegStartedOn": "2024-06-01",
        }))
        .unwrap();
        assert_eq!(veg.potential_harvest(), Some(d("2024-08-24")));

        let mut flower = veg.clone();
        flower.change_stage(Stage::Flower, Some(d("2024-06-01"))).unwrap();
        assert_eq!(flower.potential_harvest(), Some(d("2024-07-27")));

        flower.change_stage(Stage::Harvested, None).unwrap();
        assert_eq!(flower.potential_harvest(), None);
        assert_eq!(flower.harvested_on(), Some(d("2024-06-15")));
    }

    #[test]
    fn supplied_projection_is_replaced_while_growing() {
        let plant = build(json!({
            "name": "Bob",
            "startedOn": "2024-06-01",
            "potentialHarvest": "2030-01-01",
        }))
        .unwrap();
        assert_eq!(plant.potential_harvest(), Some(d("2024-08-31")));
    }

    #[test]
    fn supplied_projection_is_forbidden_after_harvest() {
        assert_eq!(
            err(json!({
                "name": "Bob",
                "stage": "harvested",
                "vegStartedOn": "2024-04-01",
                "flowerStartedOn": "2024-05-01",
                "harvestedOn": "2024-06-01",
                "potentialHarvest": "2024-06-10",
                "startedOn": "2024-03-01",
            })),
            "potentialHarvest must be null for stage harvested."
        );
    }

    #[test]
    fn typed_constructor_validates_dates() {
        let stage_dates = StageDates::Veg {
            started_on: d("2024-05-01"),
            veg_started_on: d("2024-06-01"),
        };
        let plant = PlantRecord::new(
            "Blue Dream",
            stage_dates,
            StatusDates::Archived {
                archived_on: d("2024-06-10"),
            },
            ctx(),
        )
        .unwrap();
        assert_eq!(plant.stage(), Stage::Veg);
        assert_eq!(plant.status(), Status::Archived);

        let future = StageDates::seedling(d("2024-07-01"));
        assert_eq!(
            PlantRecord::new("Blue Dream", future, StatusDates::Active, ctx()).unwrap_err(),
            ValidationError::FutureDate(DateField::StartedOn)
        );
    }

    #[test]
    fn lifecycle_transition_table() {
        let active = || build(json!({ "name": "Bob" })).unwrap();
        let archived = || {
            let mut p = active();
            assert!(p.archive());
            p
        };
        let inactive = || {
            let mut p = active();
            assert!(p.delete());
            p
        };

        type Op = fn(&mut PlantRecord) -> bool;
        let ops: [(&str, Op); 4] = [
            ("delete", PlantRecord::delete),
            ("undelete", PlantRecord::undelete),
            ("archive", PlantRecord::archive),
            ("unarchive", PlantRecord::unarchive),
        ];
        let expected = [
            (active(), [Status::Inactive, Status::Active, Status::Archived, Status::Active]),
            (archived(), [Status::Inactive, Status::Archived, Status::Archived, Status::Active]),
            (inactive(), [Status::Inactive, Status::Active, Status::Inactive, Status::Inactive]),
        ];

        for (start, outcomes) in expected {
            for ((name, op), want) in ops.iter().zip(outcomes) {
                let mut plant = start.clone();
                op(&mut plant);
                assert_eq!(plant.status(), want, "{} from {}", name, start.status());
                let dates = plant.dates();
                assert_eq!(dates.archived_on.is_some(), want == Status::Archived);
                assert_eq!(dates.deleted_on.is_some(), want == Status::Inactive);
            }
        }
    }

    #[test]
    fn delete_is_idempotent_and_keeps_first_date() {
        let mut plant = build(json!({ "name": "Bob", "startedOn": "2024-06-01" })).unwrap();
        assert!(plant.delete());
        let first = plant.deleted_on();

        let mut later = PlantRecord::from_document(&plant.to_document(), ctx_on("2024-07-01")).unwrap();
        assert!(!later.delete());
        assert_eq!(later.status(), Status::Inactive);
        assert_eq!(later.deleted_on(), first);
    }

    #[test]
    fn unarchive_on_active_is_noop() {
        let mut plant = build(json!({ "name": "Bob" })).unwrap();
        let before = plant.clone();
        assert!(!plant.unarchive());
        assert_eq!(plant, before);
    }

    #[test]
    fn setters_leave_record_intact_on_failure() {
        let mut plant = flowering();
        let before = plant.clone();

        assert_eq!(
            plant.set_harvested_on(Some(d("2024-06-20"))),
            Err(ValidationError::FutureDate(DateField::HarvestedOn))
        );
        assert_eq!(
            plant.set_harvested_on(Some(d("2024-06-10"))).unwrap_err().to_string(),
            "harvestedOn must be null for stage flower."
        );
        assert_eq!(
            plant.set_veg_started_on(None).unwrap_err().to_string(),
            "vegStartedOn is required for stage flower."
        );
        assert_eq!(
            plant.set_date(DateField::PotentialHarvest, Some(d("2024-06-10"))),
            Err(ValidationError::DerivedField(DateField::PotentialHarvest))
        );
        assert_eq!(
            plant.set_date(DateField::StartedOn, None).unwrap_err().to_string(),
            "startedOn is required"
        );
        assert_eq!(
            plant.set_archived_on(Some(d("2024-06-01"))).unwrap_err().to_string(),
            "archivedOn must be null for status active."
        );
        assert_eq!(plant.set_name("no"), Err(ValidationError::TooShort { field: "name", min: 3 }));
        assert_eq!(plant, before);
    }

    #[test]
    fn setters_recompute_projection() {
        let mut plant = flowering();
        plant.set_flower_started_on(Some(d("2024-06-01"))).unwrap();
        assert_eq!(plant.potential_harvest(), Some(d("2024-07-27")));

        plant
            .set_date_value(DateField::FlowerStartedOn, &json!("2024-05-06T08:30:00"))
            .unwrap();
        assert_eq!(plant.flower_started_on(), Some(d("2024-05-06")));
        assert_eq!(plant.potential_harvest(), Some(d("2024-07-01")));

        assert_eq!(
            plant.set_date_value(DateField::FlowerStartedOn, &json!(12)),
            Err(ValidationError::InvalidDate(DateField::FlowerStartedOn))
        );
    }

    #[test]
    fn set_stage_requires_matching_dates() {
        let mut plant = build(json!({ "name": "Bob" })).unwrap();
        assert_eq!(
            plant.set_stage(Stage::Veg).unwrap_err().to_string(),
            "vegStartedOn is required for stage veg."
        );
        assert_eq!(plant.stage(), Stage::Seedling);

        let mut plant = flowering();
        assert_eq!(
            plant.set_stage(Stage::Veg).unwrap_err().to_string(),
            "flowerStartedOn must be null for stage veg."
        );
    }

    #[test]
    fn change_stage_fills_and_clears_dates() {
        let mut plant = build(json!({ "name": "Bob", "startedOn": "2024-05-01" })).unwrap();
        assert_eq!(
            plant.change_stage(Stage::Flower, None).unwrap_err().to_string(),
            "vegStartedOn is required for stage flower."
        );

        plant.change_stage(Stage::Veg, Some(d("2024-05-10"))).unwrap();
        plant.change_stage(Stage::Flower, None).unwrap();
        assert_eq!(plant.flower_started_on(), Some(d("2024-06-15")));

        plant.change_stage(Stage::Seedling, None).unwrap();
        assert_eq!(plant.stage(), Stage::Seedling);
        assert_eq!(plant.veg_started_on(), None);
        assert_eq!(plant.flower_started_on(), None);
        assert_eq!(plant.potential_harvest(), Some(d("2024-07-31")));

        assert_eq!(
            plant.change_stage(Stage::Veg, Some(d("2024-06-16"))),
            Err(ValidationError::FutureDate(DateField::VegStartedOn))
        );
    }

    #[test]
    fn patch_updates_fields_and_routes_status() {
        let plant = flowering();
        let next = plant
            .patched(&json!({
                "name": " Blue Dream #2 ",
                "stage": "harvested",
                "harvestedOn": "2024-06-14",
                "status": "archived",
                "deletedOn": "2024-06-01",
            }))
            .unwrap();

        assert_eq!(next.name(), "Blue Dream #2");
        assert_eq!(next.stage(), Stage::Harvested);
        assert_eq!(next.harvested_on(), Some(d("2024-06-14")));
        assert_eq!(next.potential_harvest(), None);
        assert_eq!(next.status(), Status::Archived);
        assert_eq!(next.archived_on(), Some(d("2024-06-15")));
        assert_eq!(next.deleted_on(), None);

        let back = next.patched(&json!({ "status": "active" })).unwrap();
        assert_eq!(back.status(), Status::Active);
        assert_eq!(plant.stage(), Stage::Flower);
    }

    #[test]
    fn patch_rejects_bad_input() {
        let plant = flowering();
        assert_eq!(
            plant.patched(&json!("flower")).unwrap_err().to_string(),
            "invalid plant object"
        );
        assert_eq!(
            plant.patched(&json!({ "stage": "drying" })).unwrap_err().to_string(),
            "unknown plant stage: drying"
        );
        assert_eq!(
            plant.patched(&json!({ "startedOn": null })).unwrap_err().to_string(),
            "startedOn is required"
        );
    }

    #[test]
    fn days_until_harvest_counts_from_today() {
        let plant = flowering();
        assert_eq!(plant.potential_harvest(), Some(d("2024-07-01")));
        assert_eq!(plant.days_until_harvest(), Some(16));
    }

    #[test]
    fn strict_projection_policy_does_not_affect_known_stages() {
        let ctx = PlantContext::new(
            Arc::new(FixedClock(d("2024-06-15"))),
            HarvestProjector::new(StageWeeks::default()).with_policy(ProjectionPolicy::Strict),
        );
        let plant = PlantRecord::seedling("Bob", ctx).unwrap();
        assert_eq!(plant.potential_harvest(), Some(d("2024-09-14")));
    }

    #[test]
    fn document_round_trip() {
        let mut plant = flowering();
        plant.archive();

        let doc = plant.to_document();
        assert_eq!(PlantRecord::from_document(&doc, ctx()).unwrap(), plant);

        let value = serde_json::to_value(&plant).unwrap();
        assert_eq!(value["archivedOn"], json!("2024-06-15"));
        assert_eq!(value["harvestedOn"], Value::Null);
        assert_eq!(PlantRecord::from_value(&value, ctx()).unwrap(), plant);
    }

    fn stage_strategy() -> impl Strategy<Value = Stage> {
        prop::sample::select(Stage::all().to_vec())
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(
            stage in stage_strategy(),
            gaps in prop::collection::vec(0i64..60, 5),
            archive in any::<bool>(),
        ) {
            // Walk backwards from today so every date is in the past.
            let today = d("2024-06-15");
            let mut on = today - chrono::Duration::days(gaps.iter().sum::<i64>());
            let mut plant = PlantRecord::seedling("Round Trip", ctx()).unwrap();
            plant.set_started_on(on).unwrap();
            for (next, gap) in Stage::all()[1..].iter().zip(&gaps[1..]) {
                if *next > stage {
                    break;
                }
                on += chrono::Duration::days(*gap);
                plant.change_stage(*next, Some(on)).unwrap();
            }
            if archive {
                plant.archive();
            }

            let value = serde_json::to_value(plant.to_document()).unwrap();
            let rebuilt = PlantRecord::from_value(&value, ctx()).unwrap();
            prop_assert_eq!(rebuilt, plant);
        }
    }
}
