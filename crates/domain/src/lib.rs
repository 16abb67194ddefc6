pub mod entities;
pub mod errors;
pub mod recurrence;
pub mod repositories;

pub use entities::*;
pub use errors::{TodoError, TodoResult};
pub use recurrence::RecurrenceEvaluator;
pub use repositories::*;
