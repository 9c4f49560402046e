use crate::shared::config::TreeConfig;
use contracts::domain::a101_category::{CategoryNode, CategoryRecord, DropdownOption};
use std::collections::{HashMap, HashSet};

/// Визуальный отступ уровня в выпадающем списке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentStyle {
    /// Символ-заполнитель (по умолчанию средняя точка)
    pub filler: char,
    /// Количество символов на один уровень
    pub width: usize,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self {
            filler: '·',
            width: 4,
        }
    }
}

impl From<&TreeConfig> for IndentStyle {
    fn from(config: &TreeConfig) -> Self {
        Self {
            filler: config.indent_filler,
            width: config.indent_width,
        }
    }
}

/// Аномалии иерархии, обнаруженные при построении дерева
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyIssue {
    /// parent_id ссылается на запись, которой нет в коллекции; запись стала корнем
    DanglingParent { id: String, parent_id: String },
    /// Запись ссылается сама на себя; запись стала корнем
    SelfReference { id: String },
    /// Замкнутая цепочка родителей; первая по порядку запись цепочки стала корнем
    Cycle { ids: Vec<String> },
    /// Повторный id; потомки привязываются к первой записи с этим id
    DuplicateId { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct TreeReport {
    pub roots: Vec<CategoryNode>,
    pub issues: Vec<HierarchyIssue>,
}

impl TreeReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    OnPath,
    Done,
}

/// Tree builder for transforming flat parent-referencing records into a forest
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    indent: IndentStyle,
}

impl TreeBuilder {
    pub fn new(indent: IndentStyle) -> Self {
        Self { indent }
    }

    pub fn from_config(config: &TreeConfig) -> Self {
        Self::new(IndentStyle::from(config))
    }

    /// Build the forest; children keep the order of the input collection
    pub fn build_tree(&self, records: &[CategoryRecord]) -> Vec<CategoryNode> {
        self.build_with_report(records).roots
    }

    /// Build the forest and collect every hierarchy anomaly met on the way
    pub fn build_with_report(&self, records: &[CategoryRecord]) -> TreeReport {
        if records.is_empty() {
            return TreeReport::default();
        }

        let arena = Arena::new(records);
        let roots = arena.materialize();
        tracing::debug!(
            "build_tree: {} total items, {} root nodes, {} issues",
            records.len(),
            roots.len(),
            arena.issues.len()
        );

        TreeReport {
            roots,
            issues: arena.issues,
        }
    }

    /// Плоский список для выпадающего списка: родитель, затем всё его поддерево
    pub fn flatten_for_selection(&self, records: &[CategoryRecord]) -> Vec<DropdownOption> {
        let arena = Arena::new(records);
        arena
            .preorder(&arena.roots)
            .into_iter()
            .map(|(index, level)| self.option(&records[index], level))
            .collect()
    }

    /// Обход готового дерева в глубину (pre-order) с вычислением уровня
    pub fn flatten_tree(&self, roots: &[CategoryNode]) -> Vec<DropdownOption> {
        let mut options = Vec::new();
        let mut stack: Vec<(&CategoryNode, usize)> =
            roots.iter().rev().map(|n| (n, 0)).collect();
        while let Some((node, level)) = stack.pop() {
            options.push(self.option(&node.record, level));
            stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
        }
        options
    }

    fn option(&self, record: &CategoryRecord, level: usize) -> DropdownOption {
        DropdownOption {
            record: record.clone(),
            level,
            display_name: self.display_name(&record.name, level),
        }
    }

    /// Имя с отступом: `····` на каждый уровень, пробел, имя
    pub fn display_name(&self, name: &str, level: usize) -> String {
        if level == 0 {
            return name.to_string();
        }
        let mut result: String = std::iter::repeat(self.indent.filler)
            .take(self.indent.width * level)
            .collect();
        result.push(' ');
        result.push_str(name);
        result
    }

    /// Идентификатор и все его потомки в порядке обхода; пусто, если id не найден
    pub fn descendant_ids(&self, records: &[CategoryRecord], id: &str) -> Vec<String> {
        let arena = Arena::new(records);
        arena
            .subtree(id)
            .into_iter()
            .map(|index| records[index].id.clone())
            .collect()
    }

    /// Варианты выбора родителя при редактировании записи `editing_id`:
    /// сама запись и её поддерево исключаются
    pub fn parent_candidates(
        &self,
        records: &[CategoryRecord],
        editing_id: Option<&str>,
    ) -> Vec<DropdownOption> {
        let arena = Arena::new(records);
        let excluded: HashSet<&str> = editing_id
            .map(|id| arena.subtree(id))
            .unwrap_or_default()
            .into_iter()
            .map(|index| records[index].id.as_str())
            .collect();

        arena
            .preorder(&arena.roots)
            .into_iter()
            .filter(|&(index, _)| !excluded.contains(records[index].id.as_str()))
            .map(|(index, level)| self.option(&records[index], level))
            .collect()
    }
}

/// Плоское хранилище связей: записи адресуются позицией во входном срезе
struct Arena<'a> {
    records: &'a [CategoryRecord],
    index: HashMap<&'a str, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    issues: Vec<HierarchyIssue>,
}

impl<'a> Arena<'a> {
    fn new(records: &'a [CategoryRecord]) -> Self {
        let (index, parents, issues) = resolve_parents(records);

        // Второй проход: раскладываем индексы по родителям в исходном порядке
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
        let mut roots = Vec::new();
        for (position, parent) in parents.iter().enumerate() {
            match parent {
                Some(p) => children[*p].push(position),
                None => roots.push(position),
            }
        }

        for issue in &issues {
            tracing::warn!("Hierarchy issue: {:?}", issue);
        }

        Self {
            records,
            index,
            children,
            roots,
            issues,
        }
    }

    /// Pre-order обход (позиция, уровень) с явным стеком
    fn preorder(&self, starts: &[usize]) -> Vec<(usize, usize)> {
        let mut order = Vec::with_capacity(self.records.len());
        let mut stack: Vec<(usize, usize)> = starts.iter().rev().map(|&s| (s, 0)).collect();
        while let Some((position, level)) = stack.pop() {
            order.push((position, level));
            stack.extend(self.children[position].iter().rev().map(|&c| (c, level + 1)));
        }
        order
    }

    fn subtree(&self, id: &str) -> Vec<usize> {
        match self.index.get(id) {
            Some(&start) => self
                .preorder(&[start])
                .into_iter()
                .map(|(position, _)| position)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Сборка узлов снизу вверх: в обратном pre-order потомки готовы раньше родителя
    fn materialize(&self) -> Vec<CategoryNode> {
        let mut built: Vec<Option<CategoryNode>> =
            (0..self.records.len()).map(|_| None).collect();
        for (position, _) in self.preorder(&self.roots).into_iter().rev() {
            let children = self.children[position]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[position] = Some(CategoryNode {
                record: self.records[position].clone(),
                children,
            });
        }
        self.roots
            .iter()
            .filter_map(|&root| built[root].take())
            .collect()
    }
}

/// Первый проход: индекс id -> позиция, разрешение ссылок на родителя
/// и разрыв циклов, чтобы каждая запись была достижима из корня
fn resolve_parents(
    records: &[CategoryRecord],
) -> (HashMap<&str, usize>, Vec<Option<usize>>, Vec<HierarchyIssue>) {
    let mut issues = Vec::new();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if index.contains_key(record.id.as_str()) {
            issues.push(HierarchyIssue::DuplicateId {
                id: record.id.clone(),
            });
        } else {
            index.insert(record.id.as_str(), position);
        }
    }

    let mut parents: Vec<Option<usize>> = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let parent = match record.parent_id.as_deref() {
            None => None,
            Some(parent_id) => match index.get(parent_id) {
                Some(&p) if p == position => {
                    issues.push(HierarchyIssue::SelfReference {
                        id: record.id.clone(),
                    });
                    None
                }
                Some(&p) => Some(p),
                None => {
                    issues.push(HierarchyIssue::DanglingParent {
                        id: record.id.clone(),
                        parent_id: parent_id.to_string(),
                    });
                    None
                }
            },
        };
        parents.push(parent);
    }

    let mut marks = vec![Mark::New; records.len()];
    for start in 0..records.len() {
        if marks[start] != Mark::New {
            continue;
        }

        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            match marks[i] {
                Mark::New => {
                    marks[i] = Mark::OnPath;
                    path.push(i);
                    current = parents[i];
                }
                Mark::OnPath => {
                    if let Some(pos) = path.iter().position(|&p| p == i) {
                        let mut cycle: Vec<usize> = path[pos..].to_vec();
                        cycle.sort_unstable();
                        parents[cycle[0]] = None;
                        issues.push(HierarchyIssue::Cycle {
                            ids: cycle.iter().map(|&c| records[c].id.clone()).collect(),
                        });
                    }
                    break;
                }
                Mark::Done => break,
            }
        }

        for i in path {
            marks[i] = Mark::Done;
        }
    }

    (index, parents, issues)
}
