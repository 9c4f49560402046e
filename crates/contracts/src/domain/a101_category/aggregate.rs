use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// Нулевой GUID из 1С, эквивалент NULL для ссылки на родителя
const ZERO_UUID: &str = "00000000-0000-0000-0000-000000000000";

// ============================================================================
// Kind
// ============================================================================

/// Справочники с иерархией родитель/потомок
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    AssetCategory,
    DocumentCategory,
    ExpenseCategory,
    Department,
}

impl CategoryKind {
    /// Имя коллекции (например, "asset_categories")
    pub fn collection_name(&self) -> &'static str {
        match self {
            CategoryKind::AssetCategory => "asset_categories",
            CategoryKind::DocumentCategory => "document_categories",
            CategoryKind::ExpenseCategory => "expense_categories",
            CategoryKind::Department => "departments",
        }
    }

    /// Имя элемента для UI
    pub fn element_name(&self) -> &'static str {
        match self {
            CategoryKind::AssetCategory => "Категория активов",
            CategoryKind::DocumentCategory => "Категория документов",
            CategoryKind::ExpenseCategory => "Категория расходов",
            CategoryKind::Department => "Подразделение",
        }
    }

    /// Имя списка для UI
    pub fn list_name(&self) -> &'static str {
        match self {
            CategoryKind::AssetCategory => "Категории активов",
            CategoryKind::DocumentCategory => "Категории документов",
            CategoryKind::ExpenseCategory => "Категории расходов",
            CategoryKind::Department => "Подразделения",
        }
    }

    pub fn all() -> Vec<CategoryKind> {
        vec![
            CategoryKind::AssetCategory,
            CategoryKind::DocumentCategory,
            CategoryKind::ExpenseCategory,
            CategoryKind::Department,
        ]
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection_name())
    }
}

// ============================================================================
// Record
// ============================================================================

/// Запись иерархического справочника после проверки на границе API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CategoryRecord {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: normalize_parent_id(parent_id.map(str::to_string)),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Узел дерева: запись и её потомки в порядке исходного списка
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub record: CategoryRecord,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Количество узлов в поддереве, включая сам узел
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Глубокая цепочка не должна разворачиваться в рекурсивный drop
impl Drop for CategoryNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Элемент плоского выпадающего списка с отступом по уровню
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    #[serde(flatten)]
    pub record: CategoryRecord,
    pub level: usize,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

// ============================================================================
// DTO
// ============================================================================

/// Запись в том виде, в котором её отдаёт API.
/// Идентификаторы могут приходить строкой или числом.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryDto {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, alias = "parentId", deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryDtoError {
    #[error("Запись без идентификатора")]
    MissingId,
}

impl TryFrom<CategoryDto> for CategoryRecord {
    type Error = CategoryDtoError;

    fn try_from(dto: CategoryDto) -> Result<Self, Self::Error> {
        let id = dto
            .id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(CategoryDtoError::MissingId)?;

        Ok(Self {
            id,
            parent_id: normalize_parent_id(dto.parent_id),
            name: dto.name.unwrap_or_default(),
            description: dto.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Результат разбора ответа списка: принятые записи и отклонённые (индекс, причина)
#[derive(Debug, Clone, Default)]
pub struct CategoryBatch {
    pub accepted: Vec<CategoryRecord>,
    pub rejected: Vec<(usize, CategoryDtoError)>,
}

/// Разбор JSON-массива записей с проверкой каждой записи
pub fn parse_category_records(json: &str) -> Result<CategoryBatch, serde_json::Error> {
    let items: Vec<CategoryDto> = serde_json::from_str(json)?;
    let mut batch = CategoryBatch::default();
    for (index, dto) in items.into_iter().enumerate() {
        match CategoryRecord::try_from(dto) {
            Ok(record) => batch.accepted.push(record),
            Err(e) => batch.rejected.push((index, e)),
        }
    }
    Ok(batch)
}

/// Пустая строка и нулевой GUID считаются отсутствием родителя
pub fn normalize_parent_id(parent_id: Option<String>) -> Option<String> {
    parent_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != ZERO_UUID)
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(i) => i.to_string(),
    }))
}
