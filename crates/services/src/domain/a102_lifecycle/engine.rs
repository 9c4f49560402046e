use super::error::{AdvanceBlocker, ChecklistError};
use crate::shared::config::ChecklistConfig;
use chrono::{DateTime, Utc};
use contracts::domain::a102_lifecycle::{
    AssignedAsset, ChecklistKind, ChecklistTask, ExitCondition, TaskStatus,
};
use std::collections::{HashMap, HashSet};

/// Рабочая копия чек-листа одного сотрудника на время одного сеанса редактирования.
///
/// Пункты адресуются по позиции в списке. Статус сотрудника движок не меняет,
/// он только сообщает о готовности к переходу (см. [`ChecklistEngine::can_advance`]).
#[derive(Debug, Clone)]
pub struct ChecklistEngine {
    kind: ChecklistKind,
    tasks: Vec<ChecklistTask>,
    live_resources: Vec<AssignedAsset>,
}

impl ChecklistEngine {
    /// Сборка рабочей копии из сохранённых пунктов и текущих активов.
    ///
    /// * пустой `persisted` + непустой шаблон: по пункту Pending на каждое имя шаблона;
    /// * офбординг: по системному пункту на каждый актив; статус переносится из
    ///   сохранённого пункта с тем же `asset_id`, пункты возвращённых активов удаляются;
    /// * пользовательские пункты идут после системных в сохранённом порядке.
    pub fn initialize(
        kind: ChecklistKind,
        persisted: Vec<ChecklistTask>,
        live_resources: Vec<AssignedAsset>,
        default_template: Option<&[String]>,
        asset_return_prefix: &str,
    ) -> Self {
        let template = default_template
            .filter(|t| persisted.is_empty() && !t.is_empty())
            .map(|t| {
                t.iter()
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(ChecklistTask::pending)
                    .collect::<Vec<_>>()
            });

        let tasks = match kind {
            ChecklistKind::Onboarding => template.unwrap_or(persisted),
            ChecklistKind::Offboarding => {
                let (protected, regular): (Vec<_>, Vec<_>) =
                    persisted.into_iter().partition(|t| t.is_protected);
                let mut tasks =
                    reconcile_protected(protected, &live_resources, asset_return_prefix);
                tasks.extend(template.unwrap_or(regular));
                tasks
            }
        };

        tracing::debug!(
            "{} checklist initialized: {} tasks, {} live resources",
            kind.display_name(),
            tasks.len(),
            live_resources.len()
        );

        Self {
            kind,
            tasks,
            live_resources,
        }
    }

    /// Инициализация с шаблоном и префиксом из конфигурации
    pub fn from_config(
        kind: ChecklistKind,
        persisted: Vec<ChecklistTask>,
        live_resources: Vec<AssignedAsset>,
        config: &ChecklistConfig,
    ) -> Self {
        let template = match kind {
            ChecklistKind::Onboarding => &config.onboarding_template,
            ChecklistKind::Offboarding => &config.offboarding_template,
        };
        Self::initialize(
            kind,
            persisted,
            live_resources,
            Some(template.as_slice()),
            &config.asset_return_prefix,
        )
    }

    pub fn kind(&self) -> ChecklistKind {
        self.kind
    }

    pub fn tasks(&self) -> &[ChecklistTask] {
        &self.tasks
    }

    /// Итоговый список для сохранения
    pub fn into_tasks(self) -> Vec<ChecklistTask> {
        self.tasks
    }

    pub fn live_resources(&self) -> &[AssignedAsset] {
        &self.live_resources
    }

    /// Добавить пользовательский пункт; дубликаты имён допускаются
    pub fn add_task(&mut self, name: &str) -> Result<usize, ChecklistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChecklistError::EmptyTaskName);
        }
        self.tasks.push(ChecklistTask::pending(name));
        Ok(self.tasks.len() - 1)
    }

    /// Удалить пункт; системные пункты не удаляются, список остаётся без изменений
    pub fn remove_task(&mut self, index: usize) -> Result<ChecklistTask, ChecklistError> {
        let task = self.task(index)?;
        if task.is_protected {
            tracing::warn!("Refused to remove protected task #{} ({})", index, task.name);
            return Err(ChecklistError::ProtectedTask {
                name: task.name.clone(),
            });
        }
        Ok(self.tasks.remove(index))
    }

    /// Переименовать пользовательский пункт
    pub fn rename_task(&mut self, index: usize, name: &str) -> Result<(), ChecklistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChecklistError::EmptyTaskName);
        }
        let task = self.task_mut(index)?;
        if task.is_protected {
            return Err(ChecklistError::ProtectedTask {
                name: task.name.clone(),
            });
        }
        task.name = name.to_string();
        Ok(())
    }

    pub fn toggle_task(&mut self, index: usize) -> Result<TaskStatus, ChecklistError> {
        self.toggle_task_at(index, Utc::now())
    }

    /// Переключить статус с явным временем отметки
    pub fn toggle_task_at(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<TaskStatus, ChecklistError> {
        let task = self.task_mut(index)?;
        task.toggle(now);
        Ok(task.status)
    }

    /// Процент выполненных пунктов, округление до целого; 0 для пустого списка
    pub fn progress(&self) -> u8 {
        let total = self.tasks.len();
        if total == 0 {
            return 0;
        }
        let done = self.tasks.iter().filter(|t| t.is_completed()).count();
        ((200 * done + total) / (2 * total)) as u8
    }

    /// Все причины, по которым переход статуса пока невозможен
    pub fn blockers(&self, exit_conditions: &[ExitCondition]) -> Vec<AdvanceBlocker> {
        let mut blockers = Vec::new();

        let progress = self.progress();
        if progress < 100 {
            blockers.push(AdvanceBlocker::IncompleteChecklist { progress });
        }

        if self.kind == ChecklistKind::Offboarding {
            if !self.live_resources.is_empty() {
                blockers.push(AdvanceBlocker::PendingAssetReturns {
                    count: self.live_resources.len(),
                });
            }
            blockers.extend(
                exit_conditions
                    .iter()
                    .filter(|c| !c.is_satisfied())
                    .map(|c| AdvanceBlocker::MissingExitField {
                        field: c.field.clone(),
                    }),
            );
        }

        blockers
    }

    pub fn can_advance(&self, exit_conditions: &[ExitCondition]) -> bool {
        self.blockers(exit_conditions).is_empty()
    }

    fn task(&self, index: usize) -> Result<&ChecklistTask, ChecklistError> {
        let len = self.tasks.len();
        self.tasks
            .get(index)
            .ok_or(ChecklistError::IndexOutOfRange { index, len })
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut ChecklistTask, ChecklistError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(ChecklistError::IndexOutOfRange { index, len })
    }
}

/// Имя системного пункта: префикс, название актива и инвентарный/серийный номер
pub fn asset_return_task_name(prefix: &str, asset: &AssignedAsset) -> String {
    let base = if prefix.trim().is_empty() {
        asset.name.clone()
    } else {
        format!("{} {}", prefix.trim(), asset.name)
    };
    match asset.identifier() {
        Some(identifier) => format!("{} ({})", base, identifier),
        None => base,
    }
}

/// Системные пункты: сначала уже сохранённые (для активов, которые ещё числятся),
/// затем новые в порядке списка активов
fn reconcile_protected(
    existing: Vec<ChecklistTask>,
    live_resources: &[AssignedAsset],
    prefix: &str,
) -> Vec<ChecklistTask> {
    let live: HashMap<&str, &AssignedAsset> = live_resources
        .iter()
        .map(|asset| (asset.id.as_str(), asset))
        .collect();

    let mut emitted: HashSet<String> = HashSet::new();
    let mut tasks = Vec::with_capacity(live_resources.len());
    let mut dropped = 0usize;

    for task in existing {
        let asset = task
            .asset_id
            .as_deref()
            .and_then(|id| live.get(id).copied());
        match asset {
            Some(asset) if emitted.insert(asset.id.clone()) => {
                tasks.push(ChecklistTask {
                    name: asset_return_task_name(prefix, asset),
                    status: task.status,
                    completed_at: task.completed_at,
                    is_protected: true,
                    asset_id: Some(asset.id.clone()),
                });
            }
            _ => dropped += 1,
        }
    }

    for asset in live_resources {
        if emitted.insert(asset.id.clone()) {
            tasks.push(ChecklistTask::protected_for(
                asset.id.clone(),
                asset_return_task_name(prefix, asset),
            ));
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} protected tasks without live resource", dropped);
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn completed(name: &str) -> ChecklistTask {
        ChecklistTask {
            status: TaskStatus::Completed,
            completed_at: Some(Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()),
            ..ChecklistTask::pending(name)
        }
    }

    fn protected(asset_id: &str, name: &str, status: TaskStatus) -> ChecklistTask {
        ChecklistTask {
            status,
            ..ChecklistTask::protected_for(asset_id, name)
        }
    }

    fn offboarding(persisted: Vec<ChecklistTask>, live: Vec<AssignedAsset>) -> ChecklistEngine {
        ChecklistEngine::initialize(ChecklistKind::Offboarding, persisted, live, None, "Вернуть")
    }

    #[test]
    fn test_progress_empty_and_rounding() {
        let engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![],
            vec![],
            None,
            "Вернуть",
        );
        assert_eq!(engine.progress(), 0);

        let engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![completed("a"), completed("b"), ChecklistTask::pending("c")],
            vec![],
            None,
            "Вернуть",
        );
        assert_eq!(engine.progress(), 67);

        let mut tasks = vec![completed("1")];
        tasks.extend((2..=8).map(|i| ChecklistTask::pending(i.to_string())));
        let engine =
            ChecklistEngine::initialize(ChecklistKind::Onboarding, tasks, vec![], None, "");
        // 12.5% округляется вверх
        assert_eq!(engine.progress(), 13);
    }

    #[test]
    fn test_template_seeds_empty_checklist() {
        let template = vec![
            "Подписать договор".to_string(),
            "  ".to_string(),
            "Выдать пропуск".to_string(),
        ];
        let engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![],
            vec![],
            Some(template.as_slice()),
            "Вернуть",
        );

        let names: Vec<&str> = engine.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Подписать договор", "Выдать пропуск"]);
        assert!(engine.tasks().iter().all(|t| t.status == TaskStatus::Pending));
    }

    #[test]
    fn test_template_ignored_when_persisted_exists() {
        let template = vec!["Из шаблона".to_string()];
        let engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![completed("Сохранённый")],
            vec![],
            Some(template.as_slice()),
            "Вернуть",
        );
        assert_eq!(engine.tasks().len(), 1);
        assert_eq!(engine.tasks()[0].name, "Сохранённый");
    }

    #[test]
    fn test_returned_asset_task_dropped() {
        let persisted = vec![protected("A1", "Return laptop", TaskStatus::Completed)];
        let engine = offboarding(persisted, vec![]);

        assert!(engine.tasks().is_empty());
        assert_eq!(engine.tasks().iter().filter(|t| t.is_protected).count(), 0);
    }

    #[test]
    fn test_reconcile_carries_status_and_orders_tasks() {
        let done_at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let persisted = vec![
            ChecklistTask::pending("Отозвать доступы"),
            ChecklistTask {
                completed_at: Some(done_at),
                ..protected("A2", "старое имя", TaskStatus::Completed)
            },
            protected("A-gone", "Вернуть монитор", TaskStatus::Pending),
            completed("Обходной лист"),
        ];
        let live = vec![
            AssignedAsset::new("A3", "Телефон"),
            AssignedAsset::new("A2", "Ноутбук").with_tag("INV-002"),
        ];

        let engine = offboarding(persisted, live);
        let tasks = engine.tasks();

        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Вернуть Ноутбук (INV-002)",
                "Вернуть Телефон",
                "Отозвать доступы",
                "Обходной лист"
            ]
        );
        assert_eq!(tasks[0].status, TaskStatus::Completed);
        assert_eq!(tasks[0].completed_at, Some(done_at));
        assert_eq!(tasks[1].status, TaskStatus::Pending);
        assert_eq!(tasks[1].asset_id.as_deref(), Some("A3"));
        assert!(tasks[0].is_protected && tasks[1].is_protected);
        assert!(!tasks[2].is_protected && !tasks[3].is_protected);
    }

    #[test]
    fn test_duplicate_live_asset_yields_one_task() {
        let live = vec![
            AssignedAsset::new("A1", "Ноутбук"),
            AssignedAsset::new("A1", "Ноутбук"),
        ];
        let engine = offboarding(vec![], live);
        assert_eq!(engine.tasks().len(), 1);
    }

    #[test]
    fn test_onboarding_ignores_live_resources() {
        let engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![ChecklistTask::pending("Выдать ноутбук")],
            vec![AssignedAsset::new("A1", "Ноутбук")],
            None,
            "Вернуть",
        );
        assert_eq!(engine.tasks().len(), 1);
        assert!(!engine.tasks()[0].is_protected);
    }

    #[test]
    fn test_offboarding_template_after_protected() {
        let template = vec!["Отозвать доступы".to_string()];
        let engine = ChecklistEngine::initialize(
            ChecklistKind::Offboarding,
            vec![],
            vec![AssignedAsset::new("A1", "Ноутбук")],
            Some(template.as_slice()),
            "Вернуть",
        );
        let names: Vec<&str> = engine.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Вернуть Ноутбук", "Отозвать доступы"]);
    }

    #[test]
    fn test_add_task() {
        let mut engine = offboarding(vec![], vec![]);
        assert_eq!(engine.add_task("   "), Err(ChecklistError::EmptyTaskName));
        assert_eq!(engine.add_task("  Сдать пропуск "), Ok(0));
        assert_eq!(engine.add_task("Сдать пропуск"), Ok(1));

        assert_eq!(engine.tasks().len(), 2);
        assert_eq!(engine.tasks()[0].name, "Сдать пропуск");
        assert_eq!(engine.tasks()[0].completed_at, None);
    }

    #[test]
    fn test_remove_protected_refused() {
        let mut engine = offboarding(vec![], vec![AssignedAsset::new("A1", "Ноутбук")]);
        engine.add_task("Сдать пропуск").unwrap();
        let before = engine.tasks().to_vec();

        let result = engine.remove_task(0);
        assert!(matches!(result, Err(ChecklistError::ProtectedTask { .. })));
        assert_eq!(engine.tasks(), before.as_slice());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![
                ChecklistTask::pending("a"),
                ChecklistTask::pending("b"),
                ChecklistTask::pending("c"),
            ],
            vec![],
            None,
            "",
        );

        let removed = engine.remove_task(1).unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<&str> = engine.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);

        assert_eq!(
            engine.remove_task(5),
            Err(ChecklistError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_rename_task() {
        let mut engine = offboarding(
            vec![ChecklistTask::pending("a")],
            vec![AssignedAsset::new("A1", "Ноутбук")],
        );
        assert!(matches!(
            engine.rename_task(0, "другое"),
            Err(ChecklistError::ProtectedTask { .. })
        ));
        engine.rename_task(1, " b ").unwrap();
        assert_eq!(engine.tasks()[1].name, "b");
        assert_eq!(engine.rename_task(1, ""), Err(ChecklistError::EmptyTaskName));
    }

    #[test]
    fn test_toggle_twice() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let mut engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![ChecklistTask::pending("a")],
            vec![],
            None,
            "",
        );

        assert_eq!(engine.toggle_task_at(0, now), Ok(TaskStatus::Completed));
        assert_eq!(engine.tasks()[0].completed_at, Some(now));
        assert_eq!(engine.progress(), 100);

        assert_eq!(engine.toggle_task(0), Ok(TaskStatus::Pending));
        assert_eq!(engine.tasks()[0].completed_at, None);
        assert!(engine.toggle_task(3).is_err());
    }

    #[test]
    fn test_offboarding_blocked_by_live_assets() {
        let live = vec![AssignedAsset::new("A1", "Ноутбук")];
        let persisted = vec![protected("A1", "x", TaskStatus::Completed)];
        let engine = offboarding(persisted, live);

        assert_eq!(engine.live_resources().len(), 1);
        assert_eq!(engine.progress(), 100);
        assert!(!engine.can_advance(&[]));
        assert_eq!(
            engine.blockers(&[]),
            vec![AdvanceBlocker::PendingAssetReturns { count: 1 }]
        );
    }

    #[test]
    fn test_offboarding_requires_exit_fields() {
        let mut engine = offboarding(vec![completed("Обходной лист")], vec![]);
        let missing = [ExitCondition::new("last_working_day", None)];
        let filled = [ExitCondition::new("last_working_day", Some("2024-05-31"))];

        assert!(!engine.can_advance(&missing));
        assert!(engine.can_advance(&filled));

        engine.add_task("Ещё пункт").unwrap();
        assert_eq!(
            engine.blockers(&filled),
            vec![AdvanceBlocker::IncompleteChecklist { progress: 50 }]
        );
    }

    #[test]
    fn test_onboarding_only_checks_progress() {
        let engine = ChecklistEngine::initialize(
            ChecklistKind::Onboarding,
            vec![completed("a")],
            vec![AssignedAsset::new("A1", "Ноутбук")],
            None,
            "",
        );
        assert!(engine.can_advance(&[ExitCondition::new("ignored", None)]));
    }

    #[test]
    fn test_empty_checklist_cannot_advance() {
        let engine = offboarding(vec![], vec![]);
        assert!(!engine.can_advance(&[]));
    }

    #[test]
    fn test_from_config_uses_kind_template() {
        let config = crate::shared::config::default_config().unwrap().checklist;
        let engine =
            ChecklistEngine::from_config(ChecklistKind::Onboarding, vec![], vec![], &config);
        assert_eq!(engine.tasks().len(), config.onboarding_template.len());
        assert_eq!(engine.kind(), ChecklistKind::Onboarding);
    }

    #[test]
    fn test_asset_task_name() {
        let asset = AssignedAsset::new("A1", "Ноутбук");
        assert_eq!(asset_return_task_name("", &asset), "Ноутбук");
        assert_eq!(
            asset_return_task_name("Return", &asset.with_tag("T-1")),
            "Return Ноутбук (T-1)"
        );
    }
}
