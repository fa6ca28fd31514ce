pub mod dates;
pub mod document;
pub mod log_entry;
pub mod plant;
pub mod stage;
pub mod stored;

pub use dates::*;
pub use document::*;
pub use log_entry::*;
pub use plant::*;
pub use stage::*;
pub use stored::*;
