pub mod config;
pub mod logger;
pub mod tree_builder;
