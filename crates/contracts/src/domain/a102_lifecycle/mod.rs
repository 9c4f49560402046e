pub mod aggregate;

pub use aggregate::{
    AssignedAsset, ChecklistKind, ChecklistTask, ExitCondition, LifecycleStatus, TaskStatus,
};
