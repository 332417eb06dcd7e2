pub mod catalog;
pub mod serialize;

pub use crate::domain::ports::CatalogStore;
pub use crate::utils::error::Result;
