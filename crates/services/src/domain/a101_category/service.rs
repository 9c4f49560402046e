use crate::shared::tree_builder::{TreeBuilder, TreeReport};
use contracts::domain::a101_category::{
    parse_category_records, CategoryKind, CategoryNode, CategoryRecord, DropdownOption,
};

/// Дерево справочника для страницы списка
pub fn category_tree(
    builder: &TreeBuilder,
    kind: CategoryKind,
    records: &[CategoryRecord],
) -> TreeReport {
    let report = builder.build_with_report(records);
    if !report.is_clean() {
        tracing::warn!(
            "{}: {} hierarchy issues in {} records",
            kind,
            report.issues.len(),
            records.len()
        );
    }
    report
}

/// Плоский список для выбора категории/подразделения
pub fn category_options(
    builder: &TreeBuilder,
    kind: CategoryKind,
    records: &[CategoryRecord],
) -> Vec<DropdownOption> {
    let options = builder.flatten_for_selection(records);
    tracing::debug!("{}: {} dropdown options", kind, options.len());
    options
}

/// Список для поля «Родитель» в форме редактирования
pub fn parent_options(
    builder: &TreeBuilder,
    kind: CategoryKind,
    records: &[CategoryRecord],
    editing_id: Option<&str>,
) -> Vec<DropdownOption> {
    let options = builder.parent_candidates(records, editing_id);
    tracing::debug!(
        "{}: {} parent candidates for {:?}",
        kind,
        options.len(),
        editing_id
    );
    options
}

/// Разбор ответа API и построение дерева; некорректные записи отбрасываются с предупреждением
pub fn tree_from_json(
    builder: &TreeBuilder,
    kind: CategoryKind,
    json: &str,
) -> anyhow::Result<Vec<CategoryNode>> {
    let batch = parse_category_records(json)
        .map_err(|e| anyhow::anyhow!("Не удалось разобрать список «{}»: {}", kind.list_name(), e))?;

    for (index, reason) in &batch.rejected {
        tracing::warn!(
            "{}: {} #{} rejected: {}",
            kind,
            kind.element_name(),
            index,
            reason
        );
    }

    Ok(category_tree(builder, kind, &batch.accepted).roots)
}
