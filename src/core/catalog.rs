use crate::adapters::sea_orm_store::SeaOrmStore;
use crate::config::toml_config::CatalogConfig;
use crate::core::serialize::{hero_power_view, hero_view, power_view, Include};
use crate::db;
use crate::domain::model::{
    EntityKind, HeroFields, HeroPowerFields, HeroPowerUpdate, HeroUpdate, NewHero, NewHeroPower,
    NewPower, PowerFields, PowerUpdate,
};
use crate::domain::ports::CatalogStore;
use crate::entities::{hero, hero_power, power};
use crate::utils::error::{CatalogError, Result};
use crate::utils::logger;
use crate::utils::validation::Validate;
use serde_json::Value;

/// The hero/power catalog as seen by the API layer.
///
/// Constrained fields are checked before the store is touched, so a rejected
/// write never leaves anything behind.
pub struct Catalog<S: CatalogStore> {
    store: S,
}

impl Catalog<SeaOrmStore> {
    /// Validate the configuration, open the database and make sure the tables exist.
    ///
    /// A `[logging]` section installs the global subscriber unless one is already set.
    pub async fn connect(config: &CatalogConfig) -> Result<Self> {
        config.validate()?;
        if let Some(logging) = &config.logging {
            if let Err(e) = logger::init_logger(logging) {
                tracing::debug!("Keeping existing subscriber: {}", e);
            }
        }
        let db = db::init_database(&config.database).await?;
        Ok(Self::new(SeaOrmStore::new(db)))
    }
}

fn log_rejection(kind: EntityKind, err: &CatalogError) {
    tracing::warn!("Rejected {} write ({}): {}", kind, err.error_code(), err);
}

impl<S: CatalogStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create_hero(&self, new: NewHero) -> Result<hero::Model> {
        let hero = self
            .store
            .insert_hero(new)
            .await
            .inspect_err(|e| log_rejection(EntityKind::Hero, e))?;
        tracing::info!("Created {}", hero);
        Ok(hero)
    }

    pub async fn create_power(&self, new: NewPower) -> Result<power::Model> {
        let power = self
            .store
            .insert_power(new)
            .await
            .inspect_err(|e| log_rejection(EntityKind::Power, e))?;
        tracing::info!("Created {}", power);
        Ok(power)
    }

    pub async fn create_hero_power(&self, new: NewHeroPower) -> Result<hero_power::Model> {
        let link = self
            .store
            .insert_hero_power(new)
            .await
            .inspect_err(|e| log_rejection(EntityKind::HeroPower, e))?;
        tracing::info!(
            "Created {} (hero {}, power {}, {})",
            link,
            link.hero_id,
            link.power_id,
            link.strength
        );
        Ok(link)
    }

    pub async fn update_hero(&self, id: i32, changes: HeroUpdate) -> Result<hero::Model> {
        let hero = self
            .store
            .update_hero(id, changes)
            .await
            .inspect_err(|e| log_rejection(EntityKind::Hero, e))?;
        tracing::info!("Updated {}", hero);
        Ok(hero)
    }

    pub async fn update_power(&self, id: i32, changes: PowerUpdate) -> Result<power::Model> {
        let power = self
            .store
            .update_power(id, changes)
            .await
            .inspect_err(|e| log_rejection(EntityKind::Power, e))?;
        tracing::info!("Updated {}", power);
        Ok(power)
    }

    pub async fn update_hero_power(
        &self,
        id: i32,
        changes: HeroPowerUpdate,
    ) -> Result<hero_power::Model> {
        let link = self
            .store
            .update_hero_power(id, changes)
            .await
            .inspect_err(|e| log_rejection(EntityKind::HeroPower, e))?;
        tracing::info!("Updated {}", link);
        Ok(link)
    }

    /// Delete a record. Heroes and powers take their join rows with them.
    pub async fn delete(&self, kind: EntityKind, id: i32) -> Result<()> {
        let cascaded = self
            .store
            .delete(kind, id)
            .await
            .inspect_err(|e| log_rejection(kind, e))?;
        tracing::info!("Deleted {} {} ({} hero_powers rows cascaded)", kind, id, cascaded);
        Ok(())
    }

    /// Create from a JSON object of field values; returns the stored record's columns.
    pub async fn create(&self, kind: EntityKind, fields: Value) -> Result<Value> {
        let created = match kind {
            EntityKind::Hero => {
                let new = NewHero::try_from(serde_json::from_value::<HeroFields>(fields)?)
                    .inspect_err(|e| log_rejection(kind, e))?;
                serde_json::to_value(self.create_hero(new).await?)?
            }
            EntityKind::Power => {
                let new = NewPower::try_from(serde_json::from_value::<PowerFields>(fields)?)
                    .inspect_err(|e| log_rejection(kind, e))?;
                serde_json::to_value(self.create_power(new).await?)?
            }
            EntityKind::HeroPower => {
                let new =
                    NewHeroPower::try_from(serde_json::from_value::<HeroPowerFields>(fields)?)
                        .inspect_err(|e| log_rejection(kind, e))?;
                serde_json::to_value(self.create_hero_power(new).await?)?
            }
        };
        Ok(created)
    }

    /// Apply the fields present in a JSON object; constrained fields are re-validated.
    pub async fn update(&self, kind: EntityKind, id: i32, fields: Value) -> Result<Value> {
        let updated = match kind {
            EntityKind::Hero => {
                let changes = HeroUpdate::try_from(serde_json::from_value::<HeroFields>(fields)?)
                    .inspect_err(|e| log_rejection(kind, e))?;
                serde_json::to_value(self.update_hero(id, changes).await?)?
            }
            EntityKind::Power => {
                let changes = PowerUpdate::try_from(serde_json::from_value::<PowerFields>(fields)?)
                    .inspect_err(|e| log_rejection(kind, e))?;
                serde_json::to_value(self.update_power(id, changes).await?)?
            }
            EntityKind::HeroPower => {
                let changes =
                    HeroPowerUpdate::try_from(serde_json::from_value::<HeroPowerFields>(fields)?)
                        .inspect_err(|e| log_rejection(kind, e))?;
                serde_json::to_value(self.update_hero_power(id, changes).await?)?
            }
        };
        Ok(updated)
    }

    /// Serialize one record, optionally with its join rows, without back-links.
    pub async fn serialize(&self, kind: EntityKind, id: i32, include: Include) -> Result<Value> {
        let value = match (kind, include) {
            (EntityKind::Hero, Include::Scalars) => {
                let hero = self.hero(id).await?;
                serde_json::to_value(hero_view(&hero, None))?
            }
            (EntityKind::Hero, Include::Related) => {
                let hero = self.hero(id).await?;
                let links = self.store.hero_links(id).await?;
                serde_json::to_value(hero_view(&hero, Some(links.as_slice())))?
            }
            (EntityKind::Power, Include::Scalars) => {
                let power = self.power(id).await?;
                serde_json::to_value(power_view(&power, None))?
            }
            (EntityKind::Power, Include::Related) => {
                let power = self.power(id).await?;
                let links = self.store.power_links(id).await?;
                serde_json::to_value(power_view(&power, Some(links.as_slice())))?
            }
            (EntityKind::HeroPower, Include::Scalars) => {
                let link = self.hero_power(id).await?;
                serde_json::to_value(hero_power_view(&link, None))?
            }
            (EntityKind::HeroPower, Include::Related) => {
                let link = self.hero_power(id).await?;
                let hero = self.hero(link.hero_id).await?;
                let power = self.power(link.power_id).await?;
                serde_json::to_value(hero_power_view(&link, Some((&hero, &power))))?
            }
        };
        tracing::debug!("Serialized {} {} ({:?})", kind, id, include);
        Ok(value)
    }

    pub async fn hero(&self, id: i32) -> Result<hero::Model> {
        self.store
            .find_hero(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::Hero, id))
    }

    pub async fn power(&self, id: i32) -> Result<power::Model> {
        self.store
            .find_power(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::Power, id))
    }

    pub async fn hero_power(&self, id: i32) -> Result<hero_power::Model> {
        self.store
            .find_hero_power(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::HeroPower, id))
    }

    pub async fn heroes(&self) -> Result<Vec<hero::Model>> {
        self.store.list_heroes().await
    }

    pub async fn powers(&self) -> Result<Vec<power::Model>> {
        self.store.list_powers().await
    }

    pub async fn hero_powers(&self) -> Result<Vec<hero_power::Model>> {
        self.store.list_hero_powers().await
    }

    /// Powers of a hero, read through its join rows on every call.
    pub async fn powers_of(&self, hero_id: i32) -> Result<Vec<power::Model>> {
        self.store.powers_of(hero_id).await
    }

    /// Heroes holding a power, read through its join rows on every call.
    pub async fn heroes_of(&self, power_id: i32) -> Result<Vec<hero::Model>> {
        self.store.heroes_of(power_id).await
    }
}
