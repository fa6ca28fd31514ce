use super::{DateSet, Stage, Status};
use serde::{Deserialize, Serialize};

/// Plain, field-for-field representation of a plant record.
///
/// Dates serialize as `YYYY-MM-DD` strings and absent dates as `null`.
/// Nothing here is validated; go through `PlantRecord::from_document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDocument {
    pub name: String,
    pub status: Status,
    pub stage: Stage,
    #[serde(flatten)]
    pub dates: DateSet,
}
