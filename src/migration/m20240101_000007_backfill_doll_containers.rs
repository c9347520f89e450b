//! Assigns a container to every doll that has none, based on its legacy
//! location. Rows that match nothing land in Home and are reported.

use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;
use tracing::{info, warn};

use super::schema::{container_id_by_name, sql};
use crate::db::entities::container::{HOME, bag_name};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        if count_unassigned(conn).await? == 0 {
            return Ok(());
        }

        let home_id = container_id_by_name(conn, HOME, true)
            .await?
            .ok_or_else(|| DbErr::Migration("Home container missing after seeding".to_owned()))?;

        let homed = conn
            .execute_raw(sql(
                "UPDATE dolls SET container_id = ?, bag_number = NULL \
                 WHERE container_id IS NULL AND location = 'HOME'",
                vec![home_id.into()],
            ))
            .await?
            .rows_affected();
        info!(count = homed, "assigned HOME dolls to Home");

        for number in unassigned_bag_numbers(conn).await? {
            let name = bag_name(number);
            let Some(container_id) = container_id_by_name(conn, &name, false).await? else {
                continue;
            };
            let moved = conn
                .execute_raw(sql(
                    "UPDATE dolls SET container_id = ? \
                     WHERE container_id IS NULL AND location = 'BAG' AND bag_number = ?",
                    vec![container_id.into(), number.into()],
                ))
                .await?
                .rows_affected();
            info!(count = moved, container = %name, "assigned bag dolls");
        }

        let anomalies = conn
            .query_all_raw(sql(
                "SELECT id, location, bag_number FROM dolls WHERE container_id IS NULL ORDER BY id",
                vec![],
            ))
            .await?;
        if anomalies.is_empty() {
            return Ok(());
        }
        for row in &anomalies {
            let id = row.try_get::<i64>("", "id")?;
            let location = row.try_get::<Option<String>>("", "location")?;
            let bag_number = row.try_get::<Option<i32>>("", "bag_number")?;
            warn!(doll_id = id, ?location, ?bag_number, "doll has no matching container, moving to Home");
        }
        conn.execute_raw(sql(
            "UPDATE dolls SET container_id = ?, location = 'HOME', bag_number = NULL \
             WHERE container_id IS NULL",
            vec![home_id.into()],
        ))
        .await?;
        warn!(count = anomalies.len(), "normalized dolls with unrecognized placement");

        Ok(())
    }
}

async fn count_unassigned<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let row = conn
        .query_one_raw(sql(
            "SELECT COUNT(*) AS pending FROM dolls WHERE container_id IS NULL",
            vec![],
        ))
        .await?;
    match row {
        Some(row) => row.try_get::<i64>("", "pending"),
        None => Ok(0),
    }
}

async fn unassigned_bag_numbers<C: ConnectionTrait>(conn: &C) -> Result<Vec<i32>, DbErr> {
    let rows = conn
        .query_all_raw(sql(
            "SELECT DISTINCT bag_number FROM dolls \
             WHERE container_id IS NULL AND location = 'BAG' AND bag_number > 0 \
             ORDER BY bag_number",
            vec![],
        ))
        .await?;
    rows.iter().map(|row| row.try_get::<i32>("", "bag_number")).collect()
}
