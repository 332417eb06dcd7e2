use crate::db::fk_constraint_name;
use crate::domain::model::{
    EntityKind, HeroPowerUpdate, HeroUpdate, NewHero, NewHeroPower, NewPower, PowerUpdate,
};
use crate::domain::ports::CatalogStore;
use crate::entities::{hero, hero_power, power};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

/// [`CatalogStore`] over a SeaORM connection.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

async fn ensure_hero<C: ConnectionTrait>(db: &C, hero_id: i32) -> Result<()> {
    if hero::Entity::find_by_id(hero_id).one(db).await?.is_none() {
        return Err(CatalogError::integrity(format!(
            "FOREIGN KEY constraint {} failed: no hero with id {}",
            fk_constraint_name("hero_powers", "hero_id", "heroes"),
            hero_id
        )));
    }
    Ok(())
}

async fn ensure_power<C: ConnectionTrait>(db: &C, power_id: i32) -> Result<()> {
    if power::Entity::find_by_id(power_id).one(db).await?.is_none() {
        return Err(CatalogError::integrity(format!(
            "FOREIGN KEY constraint {} failed: no power with id {}",
            fk_constraint_name("hero_powers", "power_id", "powers"),
            power_id
        )));
    }
    Ok(())
}

/// Rolls back before handing the error on, so nothing of the write survives.
/// The caller always gets `err`; a failed rollback is only logged.
async fn abort<T>(tx: DatabaseTransaction, err: CatalogError) -> Result<T> {
    if let Err(rollback) = tx.rollback().await {
        tracing::warn!("Rollback after {} failed: {}", err.error_code(), rollback);
    }
    Err(err)
}

#[async_trait]
impl CatalogStore for SeaOrmStore {
    async fn insert_hero(&self, new: NewHero) -> Result<hero::Model> {
        let model = hero::ActiveModel {
            name: Set(new.name),
            super_name: Set(new.super_name),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model)
    }

    async fn insert_power(&self, new: NewPower) -> Result<power::Model> {
        let model = power::ActiveModel {
            name: Set(new.name),
            description: Set(new.description.into_inner()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model)
    }

    async fn insert_hero_power(&self, new: NewHeroPower) -> Result<hero_power::Model> {
        let tx = self.db.begin().await?;

        if let Err(err) = ensure_hero(&tx, new.hero_id).await {
            return abort(tx, err).await;
        }
        if let Err(err) = ensure_power(&tx, new.power_id).await {
            return abort(tx, err).await;
        }

        let model = hero_power::ActiveModel {
            strength: Set(new.strength),
            hero_id: Set(new.hero_id),
            power_id: Set(new.power_id),
            ..Default::default()
        }
        .insert(&tx)
        .await?;

        tx.commit().await?;
        Ok(model)
    }

    async fn update_hero(&self, id: i32, changes: HeroUpdate) -> Result<hero::Model> {
        let tx = self.db.begin().await?;

        let Some(existing) = hero::Entity::find_by_id(id).one(&tx).await? else {
            return abort(tx, CatalogError::not_found(EntityKind::Hero, id)).await;
        };

        let mut active = existing.clone().into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(super_name) = changes.super_name {
            active.super_name = Set(super_name);
        }

        let model = if active.is_changed() {
            active.update(&tx).await?
        } else {
            existing
        };

        tx.commit().await?;
        Ok(model)
    }

    async fn update_power(&self, id: i32, changes: PowerUpdate) -> Result<power::Model> {
        let tx = self.db.begin().await?;

        let Some(existing) = power::Entity::find_by_id(id).one(&tx).await? else {
            return abort(tx, CatalogError::not_found(EntityKind::Power, id)).await;
        };

        let mut active = existing.clone().into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description.into_inner());
        }

        let model = if active.is_changed() {
            active.update(&tx).await?
        } else {
            existing
        };

        tx.commit().await?;
        Ok(model)
    }

    async fn update_hero_power(
        &self,
        id: i32,
        changes: HeroPowerUpdate,
    ) -> Result<hero_power::Model> {
        let tx = self.db.begin().await?;

        let Some(existing) = hero_power::Entity::find_by_id(id).one(&tx).await? else {
            return abort(tx, CatalogError::not_found(EntityKind::HeroPower, id)).await;
        };

        let mut active = existing.clone().into_active_model();
        if let Some(strength) = changes.strength {
            active.strength = Set(strength);
        }
        if let Some(hero_id) = changes.hero_id {
            if let Err(err) = ensure_hero(&tx, hero_id).await {
                return abort(tx, err).await;
            }
            active.hero_id = Set(hero_id);
        }
        if let Some(power_id) = changes.power_id {
            if let Err(err) = ensure_power(&tx, power_id).await {
                return abort(tx, err).await;
            }
            active.power_id = Set(power_id);
        }

        let model = if active.is_changed() {
            active.update(&tx).await?
        } else {
            existing
        };

        tx.commit().await?;
        Ok(model)
    }

    async fn delete(&self, kind: EntityKind, id: i32) -> Result<u64> {
        let tx = self.db.begin().await?;

        // Join rows go first, in the same transaction as their parent.
        let (cascaded, removed) = match kind {
            EntityKind::Hero => {
                let cascaded = hero_power::Entity::delete_many()
                    .filter(hero_power::Column::HeroId.eq(id))
                    .exec(&tx)
                    .await?
                    .rows_affected;
                let removed = hero::Entity::delete_by_id(id).exec(&tx).await?.rows_affected;
                (cascaded, removed)
            }
            EntityKind::Power => {
                let cascaded = hero_power::Entity::delete_many()
                    .filter(hero_power::Column::PowerId.eq(id))
                    .exec(&tx)
                    .await?
                    .rows_affected;
                let removed = power::Entity::delete_by_id(id).exec(&tx).await?.rows_affected;
                (cascaded, removed)
            }
            EntityKind::HeroPower => {
                let removed = hero_power::Entity::delete_by_id(id)
                    .exec(&tx)
                    .await?
                    .rows_affected;
                (0, removed)
            }
        };

        if removed == 0 {
            return abort(tx, CatalogError::not_found(kind, id)).await;
        }

        tx.commit().await?;

        if cascaded > 0 {
            tracing::debug!("Deleting {} {} removed {} hero_powers rows", kind, id, cascaded);
        }
        Ok(cascaded)
    }

    async fn find_hero(&self, id: i32) -> Result<Option<hero::Model>> {
        Ok(hero::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_power(&self, id: i32) -> Result<Option<power::Model>> {
        Ok(power::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_hero_power(&self, id: i32) -> Result<Option<hero_power::Model>> {
        Ok(hero_power::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_heroes(&self) -> Result<Vec<hero::Model>> {
        Ok(hero::Entity::find()
            .order_by_asc(hero::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_powers(&self) -> Result<Vec<power::Model>> {
        Ok(power::Entity::find()
            .order_by_asc(power::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_hero_powers(&self) -> Result<Vec<hero_power::Model>> {
        Ok(hero_power::Entity::find()
            .order_by_asc(hero_power::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn hero_links(&self, hero_id: i32) -> Result<Vec<(hero_power::Model, power::Model)>> {
        let rows = hero_power::Entity::find()
            .filter(hero_power::Column::HeroId.eq(hero_id))
            .order_by_asc(hero_power::Column::Id)
            .find_also_related(power::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, power)| power.map(|power| (link, power)))
            .collect())
    }

    async fn power_links(&self, power_id: i32) -> Result<Vec<(hero_power::Model, hero::Model)>> {
        let rows = hero_power::Entity::find()
            .filter(hero_power::Column::PowerId.eq(power_id))
            .order_by_asc(hero_power::Column::Id)
            .find_also_related(hero::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, hero)| hero.map(|hero| (link, hero)))
            .collect())
    }

    async fn powers_of(&self, hero_id: i32) -> Result<Vec<power::Model>> {
        let Some(hero) = hero::Entity::find_by_id(hero_id).one(&self.db).await? else {
            return Err(CatalogError::not_found(EntityKind::Hero, hero_id));
        };

        Ok(hero
            .find_related(power::Entity)
            .order_by_asc(hero_power::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn heroes_of(&self, power_id: i32) -> Result<Vec<hero::Model>> {
        let Some(power) = power::Entity::find_by_id(power_id).one(&self.db).await? else {
            return Err(CatalogError::not_found(EntityKind::Power, power_id));
        };

        Ok(power
            .find_related(hero::Entity)
            .order_by_asc(hero_power::Column::Id)
            .all(&self.db)
            .await?)
    }
}
