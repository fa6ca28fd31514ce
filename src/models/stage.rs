use super::DateField;
use serde::{Deserialize, Serialize};

/// Growth phase of a plant. Variants are declared in growth order so the
/// derived `Ord` reads as "reached at least".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Seedling,
    Veg,
    Flower,
    Harvested,
    Cure,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Seedling => "seedling",
            Stage::Veg => "veg",
            Stage::Flower => "flower",
            Stage::Harvested => "harvested",
            Stage::Cure => "cure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Seedling => "Seedling",
            Stage::Veg => "Vegetative",
            Stage::Flower => "Flowering",
            Stage::Harvested => "Harvested",
            Stage::Cure => "Curing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seedling" => Some(Stage::Seedling),
            "veg" => Some(Stage::Veg),
            "flower" => Some(Stage::Flower),
            "harvested" => Some(Stage::Harvested),
            "cure" => Some(Stage::Cure),
            _ => None,
        }
    }

    pub fn all() -> &'static [Stage] {
        &[
            Stage::Seedling,
            Stage::Veg,
            Stage::Flower,
            Stage::Harvested,
            Stage::Cure,
        ]
    }

    /// Date field recording entry into this stage.
    pub fn entry_field(&self) -> DateField {
        match self {
            Stage::Seedling => DateField::StartedOn,
            Stage::Veg => DateField::VegStartedOn,
            Stage::Flower => DateField::FlowerStartedOn,
            Stage::Harvested => DateField::HarvestedOn,
            Stage::Cure => DateField::CureStartedOn,
        }
    }

    /// True while the harvest is still ahead and a projection applies.
    pub fn is_pre_harvest(&self) -> bool {
        *self < Stage::Harvested
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of the record itself, independent of growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Deleted",
            Status::Archived => "Archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            "archived" => Some(Status::Archived),
            _ => None,
        }
    }

    pub fn all() -> &'static [Status] {
        &[Status::Active, Status::Inactive, Status::Archived]
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The key a rule table was consulted with, used in rule violation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Stage(Stage),
    Status(Status),
}

impl From<Stage> for RuleScope {
    fn from(stage: Stage) -> Self {
        RuleScope::Stage(stage)
    }
}

impl From<Status> for RuleScope {
    fn from(status: Status) -> Self {
        RuleScope::Status(status)
    }
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleScope::Stage(stage) => write!(f, "stage {}", stage),
            RuleScope::Status(status) => write!(f, "status {}", status),
        }
    }
}

/// How a plant was propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantSource {
    #[default]
    Seed,
    Clone,
}

impl PlantSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantSource::Seed => "seed",
            PlantSource::Clone => "clone",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seed" => Some(PlantSource::Seed),
            "clone" | "cutting" => Some(PlantSource::Clone),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlantSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_from_str_valid() {
        assert_eq!(Stage::from_str("seedling"), Some(Stage::Seedling));
        assert_eq!(Stage::from_str("Veg"), Some(Stage::Veg));
        assert_eq!(Stage::from_str(" FLOWER "), Some(Stage::Flower));
        assert_eq!(Stage::from_str("harvested"), Some(Stage::Harvested));
        assert_eq!(Stage::from_str("cure"), Some(Stage::Cure));
    }

    #[test]
    fn stage_from_str_rejects_harvest_alias() {
        assert_eq!(Stage::from_str("harvest"), None);
        assert_eq!(Stage::from_str(""), None);
        assert_eq!(Stage::from_str("archive"), None);
    }

    #[test]
    fn stage_round_trip() {
        for stage in Stage::all() {
            assert_eq!(Stage::from_str(stage.as_str()), Some(*stage));
        }
    }

    #[test]
    fn stage_order_follows_growth() {
        assert!(Stage::Seedling < Stage::Veg);
        assert!(Stage::Flower < Stage::Harvested);
        assert!(Stage::Flower.is_pre_harvest());
        assert!(!Stage::Cure.is_pre_harvest());
    }

    #[test]
    fn status_from_str() {
        assert_eq!(Status::from_str("active"), Some(Status::Active));
        assert_eq!(Status::from_str("Inactive"), Some(Status::Inactive));
        assert_eq!(Status::from_str("archived"), Some(Status::Archived));
        assert_eq!(Status::from_str("deleted"), None);
        assert_eq!(Status::default(), Status::Active);
    }

    #[test]
    fn stage_serializes_lowercase() {
        let json = serde_json::to_string(&Stage::Harvested).unwrap();
        assert_eq!(json, "\"harvested\"");
    }

    #[test]
    fn source_from_str() {
        assert_eq!(PlantSource::from_str("seed"), Some(PlantSource::Seed));
        assert_eq!(PlantSource::from_str("Clone"), Some(PlantSource::Clone));
        assert_eq!(PlantSource::from_str("graft"), None);
    }
}
