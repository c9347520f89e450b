use std::collections::HashMap;

use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::container::{self, SORT_ORDER_STEP};
use crate::db::entities::prelude::Container;

#[derive(Clone)]
pub struct ContainerDao {
    db: DatabaseConnection,
}

impl DaoBase for ContainerDao {
    type Entity = Container;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl ContainerDao {
    pub async fn list_active(&self) -> DaoResult<Vec<container::Model>> {
        Container::find()
            .filter(container::Column::IsActive.eq(true))
            .order_by_asc(container::Column::SortOrder)
            .order_by_asc(container::Column::Id)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_active<C>(&self, conn: &C, id: i64) -> DaoResult<Option<container::Model>>
    where
        C: ConnectionTrait,
    {
        Container::find_by_id(id)
            .filter(container::Column::IsActive.eq(true))
            .one(conn)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Containers by id regardless of state, for labelling dolls.
    pub async fn find_by_ids(&self, ids: &[i64]) -> DaoResult<HashMap<i64, container::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let containers = Container::find()
            .filter(container::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(containers
            .into_iter()
            .map(|container| (container.id, container))
            .collect())
    }

    /// Case-insensitive lookup among active containers, optionally skipping one id.
    pub async fn find_active_by_name<C>(
        &self,
        conn: &C,
        name: &str,
        exclude_id: Option<i64>,
    ) -> DaoResult<Option<container::Model>>
    where
        C: ConnectionTrait,
    {
        let mut query = Container::find()
            .filter(container::Column::IsActive.eq(true))
            .filter(
                Expr::from(Func::lower(Expr::col(container::Column::Name)))
                    .eq(name.to_lowercase()),
            );
        if let Some(id) = exclude_id {
            query = query.filter(container::Column::Id.ne(id));
        }
        query.one(conn).await.map_err(DaoLayerError::Db)
    }

    /// Highest sort order of any container, active or not, plus one step.
    /// `None` when that step would overflow.
    pub async fn next_sort_order<C>(&self, conn: &C) -> DaoResult<Option<i32>>
    where
        C: ConnectionTrait,
    {
        let last = Container::find()
            .order_by_desc(container::Column::SortOrder)
            .one(conn)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(last
            .map_or(0, |model| model.sort_order)
            .checked_add(SORT_ORDER_STEP))
    }

    pub async fn create_container<C>(
        &self,
        conn: &C,
        name: &str,
        sort_order: i32,
        is_system: bool,
    ) -> DaoResult<container::Model>
    where
        C: ConnectionTrait,
    {
        let model = container::ActiveModel {
            name: Set(name.to_string()),
            sort_order: Set(sort_order),
            is_active: Set(true),
            is_system: Set(is_system),
            ..Default::default()
        };
        self.create(conn, model).await
    }
}
