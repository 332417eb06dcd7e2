//! Hero/power catalog: three related records, two field guards and
//! cascade-on-delete join rows, persisted through SeaORM.

pub mod adapters;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod entities;
pub mod utils;

pub use crate::adapters::sea_orm_store::SeaOrmStore;
pub use crate::config::toml_config::CatalogConfig;
pub use crate::core::{catalog::Catalog, serialize::Include};
pub use crate::domain::model::EntityKind;
pub use crate::utils::error::{CatalogError, Result};
