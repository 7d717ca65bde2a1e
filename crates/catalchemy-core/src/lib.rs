//! Core contracts for Catalchemy.
//!
//! This crate defines the catalog entity types (brands, collections,
//! products, reviews), their flat row mapping, per-entity validation and
//! whole-catalog consistency checks shared by the generator and the CLI.

pub mod catalog;
pub mod entities;
pub mod error;
pub mod kind;
pub mod schema;
pub mod validation;

pub use catalog::{Catalog, TableRows};
pub use entities::{Brand, CatalogEntity, Collection, NameHints, Product, Review};
pub use error::{Error, Result};
pub use kind::EntityKind;
pub use schema::entity_json_schema;
pub use validation::{CatalogIssue, CatalogReport, normalize_name, validate_catalog};

/// Date format used by every date attribute in the catalog.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
