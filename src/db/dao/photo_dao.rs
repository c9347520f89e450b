use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::photo;
use crate::db::entities::prelude::Photo;

#[derive(Clone)]
pub struct PhotoDao {
    db: DatabaseConnection,
}

impl DaoBase for PhotoDao {
    type Entity = Photo;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl PhotoDao {
    pub async fn create_photo<C>(
        &self,
        conn: &C,
        doll_id: i64,
        path: &str,
        is_primary: bool,
        created_by: &str,
    ) -> DaoResult<photo::Model>
    where
        C: ConnectionTrait,
    {
        let model = photo::ActiveModel {
            doll_id: Set(doll_id),
            path: Set(path.to_string()),
            is_primary: Set(is_primary),
            created_by: Set(created_by.to_string()),
            ..Default::default()
        };
        self.create(conn, model).await
    }

    pub async fn find_primary<C>(&self, conn: &C, doll_id: i64) -> DaoResult<Option<photo::Model>>
    where
        C: ConnectionTrait,
    {
        Photo::find()
            .filter(photo::Column::DollId.eq(doll_id))
            .filter(photo::Column::IsPrimary.eq(true))
            .one(conn)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Demotes every primary photo of the doll. Returns how many were demoted.
    pub async fn clear_primary<C>(&self, conn: &C, doll_id: i64) -> DaoResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = Photo::update_many()
            .set(photo::ActiveModel {
                is_primary: Set(false),
                ..Default::default()
            })
            .filter(photo::Column::DollId.eq(doll_id))
            .filter(photo::Column::IsPrimary.eq(true))
            .exec(conn)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }

    pub async fn mark_primary<C>(&self, conn: &C, photo_id: i64) -> DaoResult<photo::Model>
    where
        C: ConnectionTrait,
    {
        self.update(conn, photo_id, |active| {
            active.is_primary = Set(true);
        })
        .await
    }

    /// Newest first.
    pub async fn list_for_doll(&self, doll_id: i64) -> DaoResult<Vec<photo::Model>> {
        Photo::find()
            .filter(photo::Column::DollId.eq(doll_id))
            .order_by_desc(photo::Column::CreatedAt)
            .order_by_desc(photo::Column::Id)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn count_for_doll(&self, doll_id: i64) -> DaoResult<u64> {
        Photo::find()
            .filter(photo::Column::DollId.eq(doll_id))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Primary photo path per doll, for the dolls that have one.
    pub async fn primary_paths(&self, doll_ids: &[i64]) -> DaoResult<HashMap<i64, String>> {
        if doll_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let photos = Photo::find()
            .filter(photo::Column::DollId.is_in(doll_ids.iter().copied()))
            .filter(photo::Column::IsPrimary.eq(true))
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(photos
            .into_iter()
            .map(|photo| (photo.doll_id, photo.path))
            .collect())
    }
}
