use super::calculations::format_date;
use crate::models::{DateField, PlantDocument, Status};

fn status_change(old: Status, new: Status) -> Option<&'static str> {
    match (old, new) {
        (old, new) if old == new => None,
        (_, Status::Archived) => Some("Plant archived."),
        (_, Status::Inactive) => Some("Plant deleted."),
        (Status::Archived, Status::Active) => Some("Plant unarchived."),
        (Status::Inactive, Status::Active) => Some("Plant undeleted."),
        (Status::Active, Status::Active) => None,
    }
}

/// Human-readable descriptions of what changed between two snapshots.
///
/// Status dates are described by the status line; a date that was cleared
/// gets no line of its own.
pub fn change_list(old: &PlantDocument, new: &PlantDocument) -> Vec<String> {
    let mut changes = Vec::new();

    if let Some(msg) = status_change(old.status, new.status) {
        changes.push(msg.to_string());
    }
    if old.name != new.name {
        changes.push(format!("name changed to {}", new.name));
    }
    if old.stage != new.stage {
        changes.push(format!("stage changed to {}", new.stage));
    }

    for &field in DateField::all() {
        if matches!(field, DateField::ArchivedOn | DateField::DeletedOn) {
            continue;
        }
        match (old.dates.get(field), new.dates.get(field)) {
            (old, Some(new)) if old != Some(new) => {
                changes.push(format!("{} changed to {}", field, format_date(new)));
            }
            _ => {}
        }
    }

    changes
}

/// Log message for a set of changes, or `None` when there are none.
pub fn change_log_message(changes: &[String]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    let lines: Vec<String> = changes.iter().map(|c| format!("• {}", c)).collect();
    Some(format!("Updated plant:\n{}", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateSet, Stage};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seedling() -> PlantDocument {
        PlantDocument {
            name: "Blue Dream".into(),
            status: Status::Active,
            stage: Stage::Seedling,
            dates: DateSet::default()
                .with(DateField::StartedOn, d("2024-01-01"))
                .with(DateField::PotentialHarvest, d("2024-04-01")),
        }
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        assert!(change_list(&seedling(), &seedling()).is_empty());
        assert_eq!(change_log_message(&[]), None);
    }

    #[test]
    fn stage_move_lists_stage_and_dates() {
        let old = seedling();
        let mut new = old.clone();
        new.stage = Stage::Veg;
        new.dates.veg_started_on = Some(d("2024-01-08"));
        new.dates.potential_harvest = Some(d("2024-04-01"));

        assert_eq!(
            change_list(&old, &new),
            vec!["stage changed to veg", "vegStartedOn changed to 2024-01-08"]
        );
    }

    #[test]
    fn cleared_dates_are_not_listed() {
        let mut old = seedling();
        old.stage = Stage::Veg;
        old.dates.veg_started_on = Some(d("2024-01-08"));
        let new = seedling();

        assert_eq!(change_list(&old, &new), vec!["stage changed to seedling"]);
    }

    #[test]
    fn status_messages() {
        let active = seedling();
        let mut archived = seedling();
        archived.status = Status::Archived;
        archived.dates.archived_on = Some(d("2024-02-01"));
        let mut inactive = seedling();
        inactive.status = Status::Inactive;
        inactive.dates.deleted_on = Some(d("2024-02-01"));

        assert_eq!(change_list(&active, &archived), vec!["Plant archived."]);
        assert_eq!(change_list(&archived, &active), vec!["Plant unarchived."]);
        assert_eq!(change_list(&active, &inactive), vec!["Plant deleted."]);
        assert_eq!(change_list(&inactive, &active), vec!["Plant undeleted."]);
        assert_eq!(change_list(&archived, &inactive), vec!["Plant deleted."]);
    }

    #[test]
    fn message_is_bulleted() {
        let changes = vec!["name changed to Bob".to_string(), "stage changed to veg".to_string()];
        assert_eq!(
            change_log_message(&changes).unwrap(),
            "Updated plant:\n• name changed to Bob\n• stage changed to veg"
        );
    }
}
