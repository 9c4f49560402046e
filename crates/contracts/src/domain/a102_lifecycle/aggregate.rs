use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Checklist task
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pending", alias = "Pending")]
    Pending,
    #[serde(rename = "completed", alias = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

/// Пункт чек-листа онбординга/офбординга
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTask {
    pub name: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Системный пункт (возврат актива): не удаляется вручную
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

impl ChecklistTask {
    /// Пользовательский пункт в статусе Pending
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Pending,
            completed_at: None,
            is_protected: false,
            asset_id: None,
        }
    }

    /// Системный пункт, привязанный к активу
    pub fn protected_for(asset_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Pending,
            completed_at: None,
            is_protected: true,
            asset_id: Some(asset_id.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Переключить статус; completed_at выставляется только при переходе в Completed
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.status = self.status.toggled();
        self.completed_at = match self.status {
            TaskStatus::Completed => Some(now),
            TaskStatus::Pending => None,
        };
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistKind {
    Onboarding,
    Offboarding,
}

impl ChecklistKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ChecklistKind::Onboarding => "Онбординг",
            ChecklistKind::Offboarding => "Офбординг",
        }
    }
}

/// Статус сотрудника в жизненном цикле
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Onboarding,
    Probation,
    Active,
    Offboarding,
    Inactive,
}

impl LifecycleStatus {
    /// Чек-лист, от которого зависит выход из статуса
    pub fn checklist_kind(&self) -> Option<ChecklistKind> {
        match self {
            LifecycleStatus::Onboarding => Some(ChecklistKind::Onboarding),
            LifecycleStatus::Offboarding => Some(ChecklistKind::Offboarding),
            _ => None,
        }
    }

    /// Следующий статус после завершения чек-листа (переход односторонний)
    pub fn checklist_target(&self) -> Option<LifecycleStatus> {
        match self {
            LifecycleStatus::Onboarding => Some(LifecycleStatus::Probation),
            LifecycleStatus::Offboarding => Some(LifecycleStatus::Inactive),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LifecycleStatus::Onboarding => "Онбординг",
            LifecycleStatus::Probation => "Испытательный срок",
            LifecycleStatus::Active => "Работает",
            LifecycleStatus::Offboarding => "Увольнение",
            LifecycleStatus::Inactive => "Уволен",
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Live resources & exit conditions
// ============================================================================

/// Актив, закреплённый за сотрудником (assigned_to == employee.id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedAsset {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "assetTag", alias = "asset_tag")]
    pub asset_tag: Option<String>,
    #[serde(default, rename = "serialNumber", alias = "serial_number")]
    pub serial_number: Option<String>,
}

impl AssignedAsset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_tag: None,
            serial_number: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.asset_tag = Some(tag.into());
        self
    }

    /// Инвентарный номер, либо серийный, если инвентарного нет
    pub fn identifier(&self) -> Option<&str> {
        self.asset_tag
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.serial_number.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

/// Обязательное поле увольнения (например, дата последнего рабочего дня)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCondition {
    pub field: String,
    pub value: Option<String>,
}

impl ExitCondition {
    pub fn new(field: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            field: field.into(),
            value: value.map(str::to_string),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.value.as_deref().map_or(false, |v| !v.trim().is_empty())
    }
}
