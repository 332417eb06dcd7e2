// Adapters layer: concrete implementations of the domain ports.

pub mod sea_orm_store;
