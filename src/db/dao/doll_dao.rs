use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use super::base::entity_name;
use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse, Pagination};
use crate::db::entities::doll::{self, LegacyLocation, LegacyPlacement};
use crate::db::entities::prelude::Doll;

#[derive(Clone)]
pub struct DollDao {
    db: DatabaseConnection,
}

impl DaoBase for DollDao {
    type Entity = Doll;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DollFilter {
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    pub container_id: Option<i64>,
    /// Matches the mirrored legacy column directly.
    pub location: Option<LegacyLocation>,
    pub include_deleted: bool,
}

impl DollFilter {
    fn apply(&self, mut query: Select<Doll>) -> Select<Doll> {
        if !self.include_deleted {
            query = query.filter(doll::Column::DeletedAt.is_null());
        }
        if let Some(container_id) = self.container_id {
            query = query.filter(doll::Column::ContainerId.eq(container_id));
        }
        if let Some(location) = self.location {
            query = query.filter(doll::Column::Location.eq(location));
        }
        if let Some(needle) = self.name_contains.as_deref() {
            let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
            query = query.filter(
                Expr::from(Func::lower(Expr::col(doll::Column::Name)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        query
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl DollDao {
    pub async fn create_doll<C>(
        &self,
        conn: &C,
        name: &str,
        container_id: i64,
        purchase_url: Option<String>,
        placement: LegacyPlacement,
    ) -> DaoResult<doll::Model>
    where
        C: ConnectionTrait,
    {
        let model = doll::ActiveModel {
            name: Set(name.to_string()),
            container_id: Set(Some(container_id)),
            purchase_url: Set(purchase_url),
            location: Set(placement.location),
            bag_number: Set(placement.bag_number),
            deleted_at: Set(None),
            deleted_by: Set(None),
            ..Default::default()
        };
        self.create(conn, model).await
    }

    /// Doll that exists and is not soft-deleted.
    pub async fn find_live<C>(&self, conn: &C, id: i64) -> DaoResult<doll::Model>
    where
        C: ConnectionTrait,
    {
        let model = self.find_by_id(conn, id).await?;
        if model.is_deleted() {
            return Err(DaoLayerError::NotFound {
                entity: entity_name::<Doll>(),
                id,
            });
        }
        Ok(model)
    }

    pub async fn list(
        &self,
        filter: &DollFilter,
        pagination: Pagination,
    ) -> DaoResult<PaginatedResponse<doll::Model>> {
        self.find_page(pagination, |query| filter.apply(query)).await
    }

    /// Up to `cap` matches in name order, for ranking by the caller.
    pub async fn find_matching(&self, filter: &DollFilter, cap: u64) -> DaoResult<Vec<doll::Model>> {
        filter
            .apply(Doll::find())
            .order_by_asc(doll::Column::Name)
            .order_by_asc(doll::Column::Id)
            .limit(cap)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn count_live_in_container<C>(&self, conn: &C, container_id: i64) -> DaoResult<u64>
    where
        C: ConnectionTrait,
    {
        Doll::find()
            .filter(doll::Column::ContainerId.eq(container_id))
            .filter(doll::Column::DeletedAt.is_null())
            .count(conn)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Rewrites the mirrored legacy fields of every doll in a container.
    pub async fn sync_legacy_placement<C>(
        &self,
        conn: &C,
        container_id: i64,
        placement: LegacyPlacement,
    ) -> DaoResult<u64>
    where
        C: ConnectionTrait,
    {
        let result = Doll::update_many()
            .set(doll::ActiveModel {
                location: Set(placement.location),
                bag_number: Set(placement.bag_number),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(doll::Column::ContainerId.eq(container_id))
            .exec(conn)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}
