//! Serialized views of the catalog graph.
//!
//! The graph is cyclic (hero -> hero_powers -> power -> hero_powers -> hero ...),
//! so each view names the nested types it may contain. A join row nested under
//! a hero carries its power but never the hero again, and the nested power
//! carries no join rows of its own. Powers and join rows follow the same rule
//! in their direction.

use crate::entities::{hero, hero_power, power};
use serde::Serialize;

/// How much of the graph a serialized record pulls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Include {
    /// Columns only.
    #[default]
    Scalars,
    /// Columns plus join rows with the entity on their far side.
    Related,
}

#[derive(Debug, Serialize)]
pub struct HeroView<'a> {
    #[serde(flatten)]
    pub hero: &'a hero::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_powers: Option<Vec<HeroPowerOfHero<'a>>>,
}

/// Join row nested under its hero.
#[derive(Debug, Serialize)]
pub struct HeroPowerOfHero<'a> {
    #[serde(flatten)]
    pub link: &'a hero_power::Model,
    pub power: &'a power::Model,
}

#[derive(Debug, Serialize)]
pub struct PowerView<'a> {
    #[serde(flatten)]
    pub power: &'a power::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_powers: Option<Vec<HeroPowerOfPower<'a>>>,
}

/// Join row nested under its power.
#[derive(Debug, Serialize)]
pub struct HeroPowerOfPower<'a> {
    #[serde(flatten)]
    pub link: &'a hero_power::Model,
    pub hero: &'a hero::Model,
}

#[derive(Debug, Serialize)]
pub struct HeroPowerView<'a> {
    #[serde(flatten)]
    pub link: &'a hero_power::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<&'a hero::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<&'a power::Model>,
}

pub fn hero_view<'a>(
    hero: &'a hero::Model,
    links: Option<&'a [(hero_power::Model, power::Model)]>,
) -> HeroView<'a> {
    HeroView {
        hero,
        hero_powers: links.map(|links| {
            links
                .iter()
                .map(|(link, power)| HeroPowerOfHero { link, power })
                .collect()
        }),
    }
}

pub fn power_view<'a>(
    power: &'a power::Model,
    links: Option<&'a [(hero_power::Model, hero::Model)]>,
) -> PowerView<'a> {
    PowerView {
        power,
        hero_powers: links.map(|links| {
            links
                .iter()
                .map(|(link, hero)| HeroPowerOfPower { link, hero })
                .collect()
        }),
    }
}

pub fn hero_power_view<'a>(
    link: &'a hero_power::Model,
    parents: Option<(&'a hero::Model, &'a power::Model)>,
) -> HeroPowerView<'a> {
    HeroPowerView {
        link,
        hero: parents.map(|(hero, _)| hero),
        power: parents.map(|(_, power)| power),
    }
}
