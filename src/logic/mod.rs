pub mod abbr;
pub mod calculations;
pub mod changes;
pub mod clock;
pub mod date_validator;
pub mod projection;
pub mod rules;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_validator::DateValidator;
pub use projection::{HarvestProjector, ProjectionPolicy, StageWeeks};
pub use rules::RulesEngine;
