pub mod aggregate;

pub use aggregate::{
    normalize_parent_id, parse_category_records, CategoryBatch, CategoryDto, CategoryDtoError,
    CategoryKind, CategoryNode, CategoryRecord, DropdownOption,
};
