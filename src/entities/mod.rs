//! Relational mapping for the catalog tables

pub mod hero;
pub mod hero_power;
pub mod power;

pub use hero::Entity as Hero;
pub use hero_power::Entity as HeroPower;
pub use power::Entity as Power;
