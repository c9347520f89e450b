use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[sea_orm(string_value = "DOLL_CREATED")]
    DollCreated,
    #[sea_orm(string_value = "DOLL_RENAMED")]
    DollRenamed,
    #[sea_orm(string_value = "DOLL_MOVED")]
    DollMoved,
    #[sea_orm(string_value = "DOLL_DELETED")]
    DollDeleted,
    #[sea_orm(string_value = "PHOTO_ADDED")]
    PhotoAdded,
    #[sea_orm(string_value = "PHOTO_SET_PRIMARY")]
    PhotoSetPrimary,
}

/// Audit row. Written once, never updated.
#[base_entity(without_updated_at)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(indexed)]
    pub doll_id: i64,
    #[sea_orm(indexed)]
    pub event_type: EventType,
    #[sea_orm(column_type = "Text", nullable)]
    pub payload: Option<String>,
    pub created_by: String,
    #[sea_orm(belongs_to, from = "doll_id", to = "id", on_delete = "Cascade")]
    pub doll: HasOne<super::doll::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
