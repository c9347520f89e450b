use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::info;

use crate::{
    auth::CurrentUser,
    db::{
        dao::{ContainerDao, DaoBase, DollDao},
        entities::{
            container::{self, MAX_SORT_ORDER},
            doll::LegacyPlacement,
        },
    },
    error::AppError,
    services::normalize_name,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerChanges {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct ContainerService {
    db: DatabaseConnection,
    containers: ContainerDao,
    dolls: DollDao,
}

impl ContainerService {
    pub fn new(db: DatabaseConnection, containers: ContainerDao, dolls: DollDao) -> Self {
        Self {
            db,
            containers,
            dolls,
        }
    }

    /// Active containers in display order.
    pub async fn list_active(&self) -> Result<Vec<container::Model>, AppError> {
        Ok(self.containers.list_active().await?)
    }

    pub async fn create(
        &self,
        user: &CurrentUser,
        name: &str,
    ) -> Result<container::Model, AppError> {
        user.require_admin()?;
        let name = normalize_name(name, "Container")?;

        let txn = self.db.begin().await?;
        self.ensure_name_available(&txn, &name, None).await?;
        let sort_order = self
            .containers
            .next_sort_order(&txn)
            .await?
            .ok_or_else(|| AppError::conflict("No sort order left; lower an existing sort_order"))?;
        let created = self
            .containers
            .create_container(&txn, &name, sort_order, false)
            .await?;
        txn.commit().await?;

        info!(container_id = created.id, name = %created.name, sort_order, "container created");
        Ok(created)
    }

    pub async fn update(
        &self,
        user: &CurrentUser,
        id: i64,
        changes: ContainerChanges,
    ) -> Result<container::Model, AppError> {
        user.require_admin()?;
        if let Some(sort_order) = changes.sort_order {
            validate_sort_order(sort_order)?;
        }
        let new_name = changes
            .name
            .as_deref()
            .map(|name| normalize_name(name, "Container"))
            .transpose()?;

        let txn = self.db.begin().await?;
        let current = self.containers.find_by_id(&txn, id).await?;

        let renamed = new_name.as_ref().filter(|name| **name != current.name);
        if renamed.is_some() && current.is_system {
            return Err(AppError::bad_request("Cannot rename system containers"));
        }

        let will_be_active = changes.is_active.unwrap_or(current.is_active);
        if current.is_active && !will_be_active {
            if current.is_system {
                return Err(AppError::bad_request("Cannot deactivate system containers"));
            }
            self.ensure_empty(&txn, id).await?;
        }

        let activating = !current.is_active && will_be_active;
        if will_be_active && (renamed.is_some() || activating) {
            let name = renamed.unwrap_or(&current.name);
            self.ensure_name_available(&txn, name, Some(id)).await?;
        }

        let name_update = renamed.cloned();
        let updated = self
            .containers
            .update(&txn, id, move |active: &mut container::ActiveModel| {
                if let Some(name) = name_update {
                    active.name = Set(name);
                }
                if let Some(sort_order) = changes.sort_order {
                    active.sort_order = Set(sort_order);
                }
                active.is_active = Set(will_be_active);
            })
            .await?;

        if renamed.is_some() {
            let placement = LegacyPlacement::for_container_name(&updated.name);
            let synced = self
                .dolls
                .sync_legacy_placement(&txn, id, placement)
                .await?;
            info!(container_id = id, dolls = synced, "resynced legacy placement after rename");
        }
        txn.commit().await?;

        info!(container_id = id, name = %updated.name, is_active = updated.is_active, "container updated");
        Ok(updated)
    }

    /// Soft delete: flips `is_active` off once the container holds no live dolls.
    pub async fn delete(&self, user: &CurrentUser, id: i64) -> Result<(), AppError> {
        user.require_admin()?;

        let txn = self.db.begin().await?;
        let current = self
            .containers
            .find_active(&txn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Container {id} not found")))?;
        if current.is_system {
            return Err(AppError::bad_request("Cannot delete system containers"));
        }
        self.ensure_empty(&txn, id).await?;

        self.containers
            .update(&txn, id, |active: &mut container::ActiveModel| {
                active.is_active = Set(false);
            })
            .await?;
        txn.commit().await?;

        info!(container_id = id, name = %current.name, "container deactivated");
        Ok(())
    }

    async fn ensure_name_available<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), AppError> {
        let existing = self
            .containers
            .find_active_by_name(conn, name, exclude_id)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict(format!(
                "Container with name '{name}' already exists"
            )));
        }
        Ok(())
    }

    async fn ensure_empty<C: ConnectionTrait>(&self, conn: &C, id: i64) -> Result<(), AppError> {
        let count = self.dolls.count_live_in_container(conn, id).await?;
        if count > 0 {
            return Err(AppError::conflict(format!(
                "Container not empty. It contains {count} doll(s)."
            )));
        }
        Ok(())
    }
}

fn validate_sort_order(sort_order: i32) -> Result<(), AppError> {
    if (-MAX_SORT_ORDER..=MAX_SORT_ORDER).contains(&sort_order) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!(
            "sort_order must be between -{MAX_SORT_ORDER} and {MAX_SORT_ORDER}"
        )))
    }
}
