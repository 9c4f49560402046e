pub mod engine;
pub mod error;
pub mod transition;

pub use engine::{asset_return_task_name, ChecklistEngine};
pub use error::{AdvanceBlocker, ChecklistError, TransitionError};
pub use transition::plan_transition;
