use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, Set};
use serde_json::Value;

use super::{DaoBase, DaoResult, PaginatedResponse, Pagination};
use crate::db::entities::event::{self, EventType};
use crate::db::entities::prelude::Event;

/// Append-only. Rows are never updated or deleted.
#[derive(Clone)]
pub struct EventDao {
    db: DatabaseConnection,
}

impl DaoBase for EventDao {
    type Entity = Event;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl EventDao {
    pub async fn append<C>(
        &self,
        conn: &C,
        doll_id: i64,
        event_type: EventType,
        payload: &Value,
        created_by: &str,
    ) -> DaoResult<event::Model>
    where
        C: ConnectionTrait,
    {
        let model = event::ActiveModel {
            doll_id: Set(doll_id),
            event_type: Set(event_type),
            payload: Set(Some(payload.to_string())),
            created_by: Set(created_by.to_string()),
            ..Default::default()
        };
        self.create(conn, model).await
    }

    pub async fn list_for_doll(
        &self,
        doll_id: i64,
        pagination: Pagination,
    ) -> DaoResult<PaginatedResponse<event::Model>> {
        self.find_page(pagination, |query| {
            query.filter(event::Column::DollId.eq(doll_id))
        })
        .await
    }

    pub async fn list_all(&self, pagination: Pagination) -> DaoResult<PaginatedResponse<event::Model>> {
        self.find_page(pagination, |query| query).await
    }
}
