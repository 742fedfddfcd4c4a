/// Database connection settings and table creation
pub mod database;

/// Person/product catalog loading from a TOML file
pub mod catalog;
