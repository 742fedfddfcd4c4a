//! Catalog configuration loading from a TOML file
//!
//! The catalog lists persons and products that must exist before any
//! transaction can reference them. It is used to seed a fresh database; see
//! [`crate::core::catalog::seed_catalog`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Used when `CATALOG_PATH` is not set.
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Configuration structure representing the entire catalog file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Persons to seed
    #[serde(default)]
    pub persons: Vec<PersonConfig>,
    /// Products to seed
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// A single `[[persons]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct PersonConfig {
    pub rut: String,
    pub name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub beneficiary_id: Option<i32>,
}

/// A single `[[products]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub measure: String,
    #[serde(rename = "type")]
    pub product_type: String,
    /// Unit price in whole currency units
    pub price: i64,
}

/// Loads the catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Path of the catalog file, from `CATALOG_PATH` or [`DEFAULT_CATALOG_PATH`].
#[must_use]
pub fn catalog_path() -> String {
    std::env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}
