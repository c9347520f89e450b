use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::container;

/// Pre-container placement. Mirrored from the container on every write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum LegacyLocation {
    #[sea_orm(string_value = "HOME")]
    Home,
    #[sea_orm(string_value = "BAG")]
    Bag,
}

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dolls")]
pub struct Model {
    #[sea_orm(indexed)]
    pub name: String,
    #[sea_orm(indexed)]
    pub container_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub purchase_url: Option<String>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    #[sea_orm(indexed)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<String>,
    #[sea_orm(belongs_to, from = "container_id", to = "id")]
    pub container: HasOne<super::container::Entity>,
    #[sea_orm(has_many)]
    pub events: HasMany<super::event::Entity>,
    #[sea_orm(has_many)]
    pub photos: HasMany<super::photo::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Legacy `location`/`bag_number` pair derived from a container name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyPlacement {
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
}

impl LegacyPlacement {
    pub const HOME: Self = Self {
        location: Some(LegacyLocation::Home),
        bag_number: None,
    };

    pub const NONE: Self = Self {
        location: None,
        bag_number: None,
    };

    pub fn bag(number: i32) -> Self {
        Self {
            location: Some(LegacyLocation::Bag),
            bag_number: Some(number),
        }
    }

    /// "Home" maps to HOME, "Bag N" to BAG/N, anything else has no legacy form.
    pub fn for_container_name(name: &str) -> Self {
        if name == container::HOME {
            return Self::HOME;
        }
        container::parse_bag_name(name).map_or(Self::NONE, Self::bag)
    }
}

#[cfg(test)]
mod tests {
    use super::{LegacyLocation, LegacyPlacement};

    #[test]
    fn home_container_maps_to_home_without_bag() {
        let placement = LegacyPlacement::for_container_name("Home");
        assert_eq!(placement.location, Some(LegacyLocation::Home));
        assert_eq!(placement.bag_number, None);
    }

    #[test]
    fn bag_container_maps_to_bag_number() {
        assert_eq!(LegacyPlacement::for_container_name("Bag 12"), LegacyPlacement::bag(12));
    }

    #[test]
    fn other_names_have_no_legacy_form() {
        for name in ["Wishlist", "Shelf", "Bag", "Bag 0", "Bag -2", "Bag 03", "bag 3", "home"] {
            assert_eq!(
                LegacyPlacement::for_container_name(name),
                LegacyPlacement::NONE,
                "{name}"
            );
        }
    }
}
