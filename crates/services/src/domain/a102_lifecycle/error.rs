use contracts::domain::a102_lifecycle::{ChecklistKind, LifecycleStatus};
use thiserror::Error;

/// Ошибки операций с чек-листом (текст показывается пользователю)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    #[error("Название пункта не может быть пустым")]
    EmptyTaskName,

    #[error("Пункт «{name}» создан системой и не может быть удалён или изменён")]
    ProtectedTask { name: String },

    #[error("Пункт #{index} не найден (всего пунктов: {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Причина, по которой переход статуса пока невозможен
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceBlocker {
    IncompleteChecklist { progress: u8 },
    PendingAssetReturns { count: usize },
    MissingExitField { field: String },
}

impl std::fmt::Display for AdvanceBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvanceBlocker::IncompleteChecklist { progress } => {
                write!(f, "Чек-лист выполнен на {}%", progress)
            }
            AdvanceBlocker::PendingAssetReturns { count } => {
                write!(f, "Не возвращено активов: {}", count)
            }
            AdvanceBlocker::MissingExitField { field } => {
                write!(f, "Не заполнено поле «{}»", field)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Статус «{status}» не переводится по чек-листу")]
    NotGated { status: LifecycleStatus },

    #[error(
        "Для статуса требуется чек-лист «{}», открыт «{}»",
        .expected.display_name(),
        .actual.display_name()
    )]
    ChecklistMismatch {
        expected: ChecklistKind,
        actual: ChecklistKind,
    },

    #[error("Переход заблокирован: {}", join_blockers(.0))]
    Blocked(Vec<AdvanceBlocker>),
}

fn join_blockers(blockers: &[AdvanceBlocker]) -> String {
    blockers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
