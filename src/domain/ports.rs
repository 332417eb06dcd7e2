use crate::domain::model::{
    EntityKind, HeroPowerUpdate, HeroUpdate, NewHero, NewHeroPower, NewPower, PowerUpdate,
};
use crate::entities::{hero, hero_power, power};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence for the catalog. Every write is atomic; inputs arrive already validated.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_hero(&self, hero: NewHero) -> Result<hero::Model>;
    async fn insert_power(&self, power: NewPower) -> Result<power::Model>;
    /// Fails with an integrity error when either parent is missing.
    async fn insert_hero_power(&self, link: NewHeroPower) -> Result<hero_power::Model>;

    async fn update_hero(&self, id: i32, changes: HeroUpdate) -> Result<hero::Model>;
    async fn update_power(&self, id: i32, changes: PowerUpdate) -> Result<power::Model>;
    async fn update_hero_power(
        &self,
        id: i32,
        changes: HeroPowerUpdate,
    ) -> Result<hero_power::Model>;

    /// Removes the row and, for heroes and powers, every join row pointing at it.
    /// Returns the number of join rows removed along with it.
    async fn delete(&self, kind: EntityKind, id: i32) -> Result<u64>;

    async fn find_hero(&self, id: i32) -> Result<Option<hero::Model>>;
    async fn find_power(&self, id: i32) -> Result<Option<power::Model>>;
    async fn find_hero_power(&self, id: i32) -> Result<Option<hero_power::Model>>;

    async fn list_heroes(&self) -> Result<Vec<hero::Model>>;
    async fn list_powers(&self) -> Result<Vec<power::Model>>;
    async fn list_hero_powers(&self) -> Result<Vec<hero_power::Model>>;

    /// Join rows of a hero, each with the power it points at.
    async fn hero_links(&self, hero_id: i32) -> Result<Vec<(hero_power::Model, power::Model)>>;
    /// Join rows of a power, each with the hero it points at.
    async fn power_links(&self, power_id: i32) -> Result<Vec<(hero_power::Model, hero::Model)>>;

    /// Powers reachable from a hero through its join rows.
    async fn powers_of(&self, hero_id: i32) -> Result<Vec<power::Model>>;
    /// Heroes reachable from a power through its join rows.
    async fn heroes_of(&self, power_id: i32) -> Result<Vec<hero::Model>>;
}
