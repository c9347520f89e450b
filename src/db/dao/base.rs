use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, PrimaryKeyTrait, QueryOrder, QuerySelect, Select,
};

use super::base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
use super::error::{DaoLayerError, DaoResult};

/// Largest offset the SQL binder accepts (SQLite integers are signed 64-bit).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Bounded limit/offset window. Each listing passes its own default and cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn bounded(
        limit: Option<u64>,
        offset: Option<u64>,
        default_limit: u64,
        max_limit: u64,
    ) -> DaoResult<Self> {
        let limit = limit.unwrap_or(default_limit);
        let offset = offset.unwrap_or(0);
        if limit == 0 || limit > max_limit || offset > MAX_OFFSET {
            return Err(DaoLayerError::InvalidPagination { limit, offset });
        }
        Ok(Self { limit, offset })
    }
}

#[derive(Debug, serde::Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Generic row access shared by every DAO.
///
/// Writes take an explicit connection so services can run several of them
/// inside one `DatabaseTransaction`; `db()` is the pool used for plain reads.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized
where
    <Self::Entity as EntityTrait>::Model:
        FromQueryResult + IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send + Sync,
    <Self::Entity as EntityTrait>::ActiveModel:
        ActiveModelTrait<Entity = Self::Entity> + TimestampedActiveModel + Send,
    <<Self::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType:
        From<i64> + Send + Sync,
    Self::Entity: HasCreatedAtColumn,
{
    type Entity: EntityTrait + Send + Sync;

    fn from_db(db: DatabaseConnection) -> Self;

    fn new(db: &DatabaseConnection) -> Self {
        Self::from_db(db.clone())
    }

    fn db(&self) -> &DatabaseConnection;

    async fn create<C>(
        &self,
        conn: &C,
        data: impl IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().fixed_offset();
        let mut active = data.into_active_model();
        active.set_created_at(now);
        active.set_updated_at(now);
        active.insert(conn).await.map_err(DaoLayerError::Db)
    }

    async fn find_by_id<C>(
        &self,
        conn: &C,
        id: i64,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        C: ConnectionTrait,
    {
        let model = Self::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(DaoLayerError::Db)?;

        model.ok_or(DaoLayerError::NotFound {
            entity: entity_name::<Self::Entity>(),
            id,
        })
    }

    /// Newest-first page plus the total row count of the filtered query.
    async fn find_page(
        &self,
        pagination: Pagination,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<PaginatedResponse<<Self::Entity as EntityTrait>::Model>> {
        let filtered = apply(Self::Entity::find());
        let total = filtered
            .clone()
            .count(self.db())
            .await
            .map_err(DaoLayerError::Db)?;
        let items = filtered
            .order_by_desc(Self::Entity::created_at_column())
            .order_by_desc(Self::Entity::id_column())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        Ok(PaginatedResponse {
            items,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        })
    }

    async fn update<C, F>(
        &self,
        conn: &C,
        id: i64,
        apply: F,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        C: ConnectionTrait,
        F: for<'a> FnOnce(&'a mut <Self::Entity as EntityTrait>::ActiveModel) + Send,
    {
        let model = Self::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(DaoLayerError::Db)?
            .ok_or(DaoLayerError::NotFound {
                entity: entity_name::<Self::Entity>(),
                id,
            })?;

        let mut active = model.into_active_model();
        apply(&mut active);
        active.set_updated_at(Utc::now().fixed_offset());

        active.update(conn).await.map_err(DaoLayerError::Db)
    }
}

/// Entity module name (`doll`, `photo`, ...) for not-found messages.
pub fn entity_name<E: EntityTrait>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").nth(1).unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::{MAX_OFFSET, Pagination};
    use crate::db::dao::DaoLayerError;

    #[test]
    fn defaults_apply_when_absent() {
        let page = Pagination::bounded(None, None, 50, 200).expect("defaults are valid");
        assert_eq!(page, Pagination { limit: 50, offset: 0 });
    }

    #[test]
    fn limit_must_be_within_cap() {
        for limit in [0, 201] {
            let err = Pagination::bounded(Some(limit), None, 50, 200)
                .expect_err("limit out of range");
            assert!(matches!(err, DaoLayerError::InvalidPagination { .. }));
        }
    }

    #[test]
    fn offset_must_fit_a_signed_sql_integer() {
        let page = Pagination::bounded(None, Some(MAX_OFFSET), 50, 200).expect("largest offset");
        assert_eq!(page.offset, MAX_OFFSET);

        let err = Pagination::bounded(None, Some(MAX_OFFSET + 1), 50, 200)
            .expect_err("offset overflows the binder");
        assert!(matches!(
            err,
            DaoLayerError::InvalidPagination { offset, .. } if offset == MAX_OFFSET + 1
        ));
    }
}
