//! Логика справочников и чек-листов жизненного цикла сотрудника.
//!
//! Все операции синхронные и работают только с данными в памяти;
//! загрузка и сохранение выполняются внешним слоем данных.

pub mod domain;
pub mod shared;

pub use domain::a102_lifecycle::{ChecklistEngine, ChecklistError};
pub use shared::tree_builder::TreeBuilder;
