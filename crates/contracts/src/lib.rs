//! Общие типы данных для HR/ERP: иерархические справочники и чек-листы жизненного цикла

pub mod domain;
