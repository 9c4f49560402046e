pub mod a101_category;
pub mod a102_lifecycle;
