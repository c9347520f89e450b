//! Seeds the system containers and one `Bag N` per bag number in use.

use chrono::Utc;
use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;
use tracing::info;

use super::schema::{container_id_by_name, sql};
use crate::db::entities::container::{HOME, SORT_ORDER_STEP, WISHLIST, bag_name};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        if container_id_by_name(conn, HOME, true).await?.is_none() {
            insert_container(conn, HOME, 0, true).await?;
        }

        let max_bag = max_bag_number(conn).await?;
        if max_bag.checked_mul(SORT_ORDER_STEP).is_none() {
            return Err(DbErr::Migration(format!(
                "bag number {max_bag} is too large to seed containers for"
            )));
        }
        for number in 1..=max_bag {
            let name = bag_name(number);
            if container_id_by_name(conn, &name, false).await?.is_none() {
                insert_container(conn, &name, number * SORT_ORDER_STEP, false).await?;
            }
        }

        if container_id_by_name(conn, WISHLIST, true).await?.is_none() {
            let sort_order = match max_sort_order(conn).await? {
                None => SORT_ORDER_STEP,
                Some(max) => max.checked_add(SORT_ORDER_STEP).ok_or_else(|| {
                    DbErr::Migration(format!(
                        "no sort order left for {WISHLIST} after {max}"
                    ))
                })?,
            };
            insert_container(conn, WISHLIST, sort_order, true).await?;
        }

        Ok(())
    }
}

async fn insert_container<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    sort_order: i32,
    is_system: bool,
) -> Result<(), DbErr> {
    let now = Utc::now().fixed_offset();
    conn
        .execute_raw(sql(
            "INSERT INTO containers (name, sort_order, is_active, is_system, created_at, updated_at) \
             VALUES (?, ?, 1, ?, ?, ?)",
            vec![
                name.into(),
                sort_order.into(),
                is_system.into(),
                now.into(),
                now.into(),
            ],
        ))
        .await?;
    info!(name, sort_order, is_system, "seeded container");
    Ok(())
}

async fn max_bag_number<C: ConnectionTrait>(conn: &C) -> Result<i32, DbErr> {
    let row = conn
        .query_one_raw(sql(
            "SELECT MAX(bag_number) AS max_bag FROM dolls \
             WHERE location = 'BAG' AND bag_number > 0",
            vec![],
        ))
        .await?;
    match row {
        Some(row) => Ok(row.try_get::<Option<i32>>("", "max_bag")?.unwrap_or(0)),
        None => Ok(0),
    }
}

async fn max_sort_order<C: ConnectionTrait>(conn: &C) -> Result<Option<i32>, DbErr> {
    let row = conn
        .query_one_raw(sql("SELECT MAX(sort_order) AS max_sort FROM containers", vec![]))
        .await?;
    match row {
        Some(row) => row.try_get::<Option<i32>>("", "max_sort"),
        None => Ok(None),
    }
}
