use crate::entities::hero_power::Strength;
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{validate_description, validate_strength};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Hero,
    Power,
    HeroPower,
}

impl EntityKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Hero => "heroes",
            EntityKind::Power => "powers",
            EntityKind::HeroPower => "hero_powers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Hero => "Hero",
            EntityKind::Power => "Power",
            EntityKind::HeroPower => "HeroPower",
        };
        f.write_str(name)
    }
}

/// A power description that already passed [`validate_description`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate_description(Some(&value))?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHero {
    pub name: String,
    pub super_name: String,
}

impl NewHero {
    pub fn new(name: impl Into<String>, super_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: super_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPower {
    pub name: String,
    pub description: Description,
}

impl NewPower {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            description: Description::parse(description)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHeroPower {
    pub hero_id: i32,
    pub power_id: i32,
    pub strength: Strength,
}

impl NewHeroPower {
    pub fn new(hero_id: i32, power_id: i32, strength: &str) -> Result<Self> {
        Ok(Self {
            hero_id,
            power_id,
            strength: validate_strength(strength)?,
        })
    }
}

/// Partial write to a hero; `None` leaves the column as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroUpdate {
    pub name: Option<String>,
    pub super_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerUpdate {
    pub name: Option<String>,
    pub description: Option<Description>,
}

impl PowerUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Result<Self> {
        self.description = Some(Description::parse(description)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroPowerUpdate {
    pub strength: Option<Strength>,
    pub hero_id: Option<i32>,
    pub power_id: Option<i32>,
}

impl HeroPowerUpdate {
    pub fn strength(mut self, strength: &str) -> Result<Self> {
        self.strength = Some(validate_strength(strength)?);
        Ok(self)
    }
}

// Raw field maps as handed over by the API layer. The outer `Option` is whether
// the key was sent at all, the inner one whether it carried a value (`null`).
// The conversions below decide what either kind of absence means.

pub type Field<T> = Option<Option<T>>;

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Field<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeroFields {
    #[serde(default, deserialize_with = "present")]
    pub name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub super_name: Field<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerFields {
    #[serde(default, deserialize_with = "present")]
    pub name: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Field<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeroPowerFields {
    #[serde(default, deserialize_with = "present")]
    pub strength: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub hero_id: Field<i32>,
    #[serde(default, deserialize_with = "present")]
    pub power_id: Field<i32>,
}

/// Required column on create: missing and `null` are both a NOT NULL violation.
fn required<T>(field: Field<T>, table: &str, column: &str) -> Result<T> {
    field
        .flatten()
        .ok_or_else(|| CatalogError::missing_column(table, column))
}

/// Required column on update: missing keeps the stored value, `null` is a NOT NULL violation.
fn replaced<T>(field: Field<T>, table: &str, column: &str) -> Result<Option<T>> {
    match field {
        None => Ok(None),
        Some(value) => value
            .map(Some)
            .ok_or_else(|| CatalogError::missing_column(table, column)),
    }
}

impl TryFrom<HeroFields> for NewHero {
    type Error = CatalogError;

    fn try_from(fields: HeroFields) -> Result<Self> {
        let name = required(fields.name, "heroes", "name")?;
        let super_name = required(fields.super_name, "heroes", "super_name")?;
        Ok(Self { name, super_name })
    }
}

impl TryFrom<PowerFields> for NewPower {
    type Error = CatalogError;

    fn try_from(fields: PowerFields) -> Result<Self> {
        let description = fields.description.flatten();
        let description = validate_description(description.as_deref())?.to_string();
        let description = Description(description);
        let name = required(fields.name, "powers", "name")?;
        Ok(Self { name, description })
    }
}

impl TryFrom<HeroPowerFields> for NewHeroPower {
    type Error = CatalogError;

    fn try_from(fields: HeroPowerFields) -> Result<Self> {
        // A sent `null` is a bad strength, a missing key a missing column.
        let strength = match fields.strength {
            None => return Err(CatalogError::missing_column("hero_powers", "strength")),
            Some(value) => validate_strength(value.as_deref().unwrap_or_default())?,
        };
        let hero_id = required(fields.hero_id, "hero_powers", "hero_id")?;
        let power_id = required(fields.power_id, "hero_powers", "power_id")?;
        Ok(Self {
            hero_id,
            power_id,
            strength,
        })
    }
}

impl TryFrom<HeroFields> for HeroUpdate {
    type Error = CatalogError;

    fn try_from(fields: HeroFields) -> Result<Self> {
        Ok(Self {
            name: replaced(fields.name, "heroes", "name")?,
            super_name: replaced(fields.super_name, "heroes", "super_name")?,
        })
    }
}

impl TryFrom<PowerFields> for PowerUpdate {
    type Error = CatalogError;

    fn try_from(fields: PowerFields) -> Result<Self> {
        // A sent description is always checked, `null` included.
        let description = match fields.description {
            None => None,
            Some(value) => {
                let description = validate_description(value.as_deref())?.to_string();
                Some(Description(description))
            }
        };
        Ok(Self {
            name: replaced(fields.name, "powers", "name")?,
            description,
        })
    }
}

impl TryFrom<HeroPowerFields> for HeroPowerUpdate {
    type Error = CatalogError;

    fn try_from(fields: HeroPowerFields) -> Result<Self> {
        let strength = match fields.strength {
            None => None,
            Some(value) => Some(validate_strength(value.as_deref().unwrap_or_default())?),
        };
        Ok(Self {
            strength,
            hero_id: replaced(fields.hero_id, "hero_powers", "hero_id")?,
            power_id: replaced(fields.power_id, "hero_powers", "power_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_power_validates_description() {
        let power = NewPower::new("Fly", "Allows the wielder to fly at great speed").unwrap();
        assert_eq!(power.description.as_str(), "Allows the wielder to fly at great speed");

        let err = NewPower::new("Fly", "short").unwrap_err();
        assert_eq!(err.error_code(), "ValidationError");
    }

    #[test]
    fn test_new_hero_power_validates_strength() {
        assert!(NewHeroPower::new(1, 1, "Strong").is_ok());
        let err = NewHeroPower::new(1, 1, "Mighty").unwrap_err();
        assert_eq!(err.to_string(), "Validation error on strength: Invalid strength value.");
    }

    #[test]
    fn test_power_fields_absent_description_is_validation_error() {
        let fields = PowerFields {
            name: Some(Some("Fly".to_string())),
            description: None,
        };
        let err = NewPower::try_from(fields).unwrap_err();
        assert_eq!(err.error_code(), "ValidationError");

        let fields = PowerFields {
            name: Some(Some("Fly".to_string())),
            description: Some(None),
        };
        assert_eq!(
            NewPower::try_from(fields).unwrap_err().error_code(),
            "ValidationError"
        );
    }

    #[test]
    fn test_missing_required_field_is_integrity_error() {
        let fields = HeroFields {
            name: Some(Some("Kamala Khan".to_string())),
            super_name: None,
        };
        let err = NewHero::try_from(fields).unwrap_err();
        assert_eq!(err.error_code(), "IntegrityError");

        let fields = HeroPowerFields {
            strength: Some(Some("Weak".to_string())),
            hero_id: Some(None),
            power_id: Some(Some(1)),
        };
        assert_eq!(
            NewHeroPower::try_from(fields).unwrap_err().error_code(),
            "IntegrityError"
        );
    }

    #[test]
    fn test_update_fields_only_validate_present_values() {
        let update = PowerUpdate::try_from(PowerFields {
            name: Some(Some("Flight".to_string())),
            description: None,
        })
        .unwrap();
        assert_eq!(update.name.as_deref(), Some("Flight"));
        assert!(update.description.is_none());

        assert!(PowerUpdate::try_from(PowerFields {
            name: None,
            description: Some(Some("too short".to_string())),
        })
        .is_err());

        assert!(HeroPowerUpdate::default().strength("Ultra").is_err());
        assert_eq!(
            HeroPowerUpdate::default().strength("Weak").unwrap().strength,
            Some(Strength::Weak)
        );
    }

    #[test]
    fn test_null_is_distinct_from_absent() {
        let fields: PowerFields = serde_json::from_value(serde_json::json!({"description": null})).unwrap();
        assert!(fields.name.is_none());
        assert_eq!(fields.description, Some(None));

        let err = PowerUpdate::try_from(fields).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error on description: Description must be present and at least 20 characters long"
        );

        let fields: HeroPowerFields = serde_json::from_value(serde_json::json!({"strength": null})).unwrap();
        let err = HeroPowerUpdate::try_from(fields).unwrap_err();
        assert_eq!(err.to_string(), "Validation error on strength: Invalid strength value.");

        let fields: HeroFields = serde_json::from_value(serde_json::json!({"name": null})).unwrap();
        let err = HeroUpdate::try_from(fields).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Integrity error: NOT NULL constraint failed: heroes.name"
        );

        let fields: HeroPowerFields = serde_json::from_value(serde_json::json!({"power_id": null})).unwrap();
        assert_eq!(
            HeroPowerUpdate::try_from(fields).unwrap_err().error_code(),
            "IntegrityError"
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let value = serde_json::json!({"name": "Kamala Khan", "super_name": "Ms. Marvel", "alias": "x"});
        assert!(serde_json::from_value::<HeroFields>(value).is_err());
    }

    #[test]
    fn test_entity_kind_names() {
        assert_eq!(EntityKind::HeroPower.to_string(), "HeroPower");
        assert_eq!(EntityKind::HeroPower.table_name(), "hero_powers");
    }
}
