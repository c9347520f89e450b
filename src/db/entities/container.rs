use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

pub const HOME: &str = "Home";
pub const WISHLIST: &str = "Wishlist";
pub const SORT_ORDER_STEP: i32 = 10;
/// Bound on the magnitude of a sort order set through the API.
pub const MAX_SORT_ORDER: i32 = 1_000_000;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "containers")]
pub struct Model {
    pub name: String,
    #[sea_orm(indexed)]
    pub sort_order: i32,
    #[sea_orm(indexed)]
    pub is_active: bool,
    pub is_system: bool,
    #[sea_orm(has_many)]
    pub dolls: HasMany<super::doll::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

/// Canonical name of the container backing legacy bag `number`.
pub fn bag_name(number: i32) -> String {
    format!("Bag {number}")
}

/// Inverse of [`bag_name`]. Only the canonical spelling matches.
pub fn parse_bag_name(name: &str) -> Option<i32> {
    let number = name.strip_prefix("Bag ")?.parse::<i32>().ok()?;
    (number > 0 && bag_name(number) == name).then_some(number)
}
