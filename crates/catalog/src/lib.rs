pub mod index;
pub mod query;

pub use index::{CatalogIndex, ResolvedPrerequisite, UNKNOWN_COURSE_TITLE};
pub use query::{InstanceRow, TITLE_NOT_FOUND};
