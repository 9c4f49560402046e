use super::engine::ChecklistEngine;
use super::error::TransitionError;
use contracts::domain::a102_lifecycle::{ExitCondition, LifecycleStatus};

/// Проверка перехода статуса по чек-листу.
///
/// Возвращает целевой статус, если переход разрешён. Сам статус меняет слой данных.
pub fn plan_transition(
    current: LifecycleStatus,
    engine: &ChecklistEngine,
    exit_conditions: &[ExitCondition],
) -> Result<LifecycleStatus, TransitionError> {
    let (expected, target) = match (current.checklist_kind(), current.checklist_target()) {
        (Some(kind), Some(target)) => (kind, target),
        _ => return Err(TransitionError::NotGated { status: current }),
    };

    if engine.kind() != expected {
        return Err(TransitionError::ChecklistMismatch {
            expected,
            actual: engine.kind(),
        });
    }

    let blockers = engine.blockers(exit_conditions);
    if !blockers.is_empty() {
        tracing::info!(
            "Transition {:?} -> {:?} blocked: {} reasons",
            current,
            target,
            blockers.len()
        );
        return Err(TransitionError::Blocked(blockers));
    }

    Ok(target)
}
