use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(without_updated_at)]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "photos")]
pub struct Model {
    #[sea_orm(indexed)]
    pub doll_id: i64,
    pub path: String,
    pub is_primary: bool,
    pub created_by: String,
    #[sea_orm(belongs_to, from = "doll_id", to = "id", on_delete = "Cascade")]
    pub doll: HasOne<super::doll::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
