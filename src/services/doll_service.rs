use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use tracing::info;

use crate::{
    auth::{CurrentUser, Permission},
    db::{
        dao::{
            ContainerDao, DaoBase, DaoLayerError, DollDao, DollFilter, EventDao,
            PaginatedResponse, Pagination, PhotoDao,
        },
        entities::{
            container::{self, HOME, bag_name},
            doll::{self, LegacyLocation, LegacyPlacement},
            event::EventType,
        },
    },
    error::AppError,
    services::normalize_name,
};

pub const LIST_DEFAULT_LIMIT: u64 = 50;
pub const LIST_MAX_LIMIT: u64 = 200;
pub const SUGGESTION_DEFAULT_LIMIT: u64 = 10;
pub const SUGGESTION_MAX_LIMIT: u64 = 20;
/// Matches fetched before ranking.
pub const SUGGESTION_CANDIDATES: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct NewDoll {
    pub name: String,
    pub container_id: Option<i64>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    pub purchase_url: Option<String>,
}

/// Partial update. `purchase_url: Some(None)` clears the link.
#[derive(Debug, Clone, Default)]
pub struct DollChanges {
    pub name: Option<String>,
    pub container_id: Option<i64>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    pub purchase_url: Option<Option<String>>,
}

impl DollChanges {
    fn touches_placement(&self) -> bool {
        self.container_id.is_some() || self.location.is_some() || self.bag_number.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DollQuery {
    pub q: Option<String>,
    pub container_id: Option<i64>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    pub include_deleted: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A doll with what the API shows next to it.
#[derive(Debug, Clone)]
pub struct DollView {
    pub doll: doll::Model,
    pub container: Option<container::Model>,
    pub primary_photo_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DollDetail {
    pub view: DollView,
    pub photos_count: u64,
}

/// Legacy `location`/`bag_number` pair from a request, narrowed to what it
/// selects.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LegacySelector {
    Container(String),
    AnyBag,
}

fn legacy_selector(
    location: Option<LegacyLocation>,
    bag_number: Option<i32>,
) -> Result<Option<LegacySelector>, AppError> {
    if bag_number.is_some_and(|number| number < 1) {
        return Err(AppError::bad_request("bag_number must be at least 1"));
    }
    match (location, bag_number) {
        (Some(LegacyLocation::Home), Some(_)) => Err(AppError::bad_request(
            "bag_number must be null when location is HOME",
        )),
        (Some(LegacyLocation::Home), None) => Ok(Some(LegacySelector::Container(HOME.to_string()))),
        (Some(LegacyLocation::Bag), Some(number)) | (None, Some(number)) => {
            Ok(Some(LegacySelector::Container(bag_name(number))))
        }
        (Some(LegacyLocation::Bag), None) => Ok(Some(LegacySelector::AnyBag)),
        (None, None) => Ok(None),
    }
}

fn normalize_url(raw: Option<String>) -> Option<String> {
    raw.map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Names starting with `query` first, then the rest, each group in
/// case-insensitive alphabetical order.
pub fn rank_by_prefix<T>(
    mut items: Vec<T>,
    name: impl Fn(&T) -> &str,
    query: &str,
    limit: usize,
) -> Vec<T> {
    let needle = query.to_lowercase();
    items.sort_by_cached_key(|item| {
        let lowered = name(item).to_lowercase();
        (!lowered.starts_with(&needle), lowered)
    });
    items.truncate(limit);
    items
}

#[derive(Clone)]
pub struct DollService {
    db: DatabaseConnection,
    dolls: DollDao,
    containers: ContainerDao,
    events: EventDao,
    photos: PhotoDao,
}

impl DollService {
    pub fn new(
        db: DatabaseConnection,
        dolls: DollDao,
        containers: ContainerDao,
        events: EventDao,
        photos: PhotoDao,
    ) -> Self {
        Self {
            db,
            dolls,
            containers,
            events,
            photos,
        }
    }

    pub async fn create(&self, user: &CurrentUser, input: NewDoll) -> Result<DollView, AppError> {
        user.require(Permission::DollCreate)?;
        let name = normalize_name(&input.name, "Doll")?;
        let purchase_url = normalize_url(input.purchase_url);

        let txn = self.db.begin().await?;
        let target = match input.container_id {
            Some(container_id) => self.active_container(&txn, container_id).await?,
            None => match legacy_selector(input.location, input.bag_number)? {
                Some(LegacySelector::Container(name)) => {
                    self.active_container_named(&txn, &name).await?
                }
                Some(LegacySelector::AnyBag) => {
                    return Err(AppError::bad_request(
                        "bag_number is required when location is BAG",
                    ));
                }
                None => {
                    return Err(AppError::bad_request(
                        "container_id or location is required",
                    ));
                }
            },
        };

        let placement = LegacyPlacement::for_container_name(&target.name);
        let created = self
            .dolls
            .create_doll(&txn, &name, target.id, purchase_url, placement)
            .await?;
        let payload = json!({
            "name": created.name,
            "container_id": target.id,
            "container_name": target.name,
            "location": placement.location,
            "bag_number": placement.bag_number,
        });
        self.events
            .append(&txn, created.id, EventType::DollCreated, &payload, &user.email)
            .await?;
        txn.commit().await?;

        info!(doll_id = created.id, container = %target.name, "doll created");
        Ok(DollView {
            doll: created,
            container: Some(target),
            primary_photo_path: None,
        })
    }

    pub async fn get(&self, user: &CurrentUser, id: i64) -> Result<DollDetail, AppError> {
        user.require(Permission::DollRead)?;
        let doll = self.dolls.find_live(self.dolls.db(), id).await?;
        let container = self.container_of(self.dolls.db(), doll.container_id).await?;
        let primary = self.photos.find_primary(self.photos.db(), id).await?;
        let photos_count = self.photos.count_for_doll(id).await?;
        Ok(DollDetail {
            view: DollView {
                doll,
                container,
                primary_photo_path: primary.map(|photo| photo.path),
            },
            photos_count,
        })
    }

    pub async fn list(
        &self,
        user: &CurrentUser,
        query: DollQuery,
    ) -> Result<PaginatedResponse<DollView>, AppError> {
        user.require(Permission::DollRead)?;
        if query.include_deleted && !user.has(Permission::DollDelete) {
            return Err(AppError::forbidden(format!(
                "Permission required to view deleted dolls: {}",
                Permission::DollDelete
            )));
        }
        let pagination = Pagination::bounded(
            query.limit,
            query.offset,
            LIST_DEFAULT_LIMIT,
            LIST_MAX_LIMIT,
        )?;

        let filter = DollFilter {
            name_contains: query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
            container_id: query.container_id,
            location: None,
            include_deleted: query.include_deleted,
        };
        let Some(filter) = self
            .narrow_by_legacy(filter, query.location, query.bag_number)
            .await?
        else {
            return Ok(PaginatedResponse {
                items: Vec::new(),
                total: 0,
                limit: pagination.limit,
                offset: pagination.offset,
            });
        };

        let PaginatedResponse {
            items,
            total,
            limit,
            offset,
        } = self.dolls.list(&filter, pagination).await?;
        Ok(PaginatedResponse {
            items: self.decorate(items).await?,
            total,
            limit,
            offset,
        })
    }

    /// Typeahead over live dolls.
    pub async fn suggestions(
        &self,
        user: &CurrentUser,
        q: &str,
        query: DollQuery,
    ) -> Result<Vec<DollView>, AppError> {
        user.require(Permission::DollRead)?;
        let needle = q.trim();
        if needle.is_empty() {
            return Err(AppError::bad_request("q must not be empty"));
        }
        let limit = Pagination::bounded(
            query.limit,
            None,
            SUGGESTION_DEFAULT_LIMIT,
            SUGGESTION_MAX_LIMIT,
        )?
        .limit;

        let filter = DollFilter {
            name_contains: Some(needle.to_string()),
            container_id: query.container_id,
            location: None,
            include_deleted: false,
        };
        let Some(filter) = self
            .narrow_by_legacy(filter, query.location, query.bag_number)
            .await?
        else {
            return Ok(Vec::new());
        };

        let candidates = self
            .dolls
            .find_matching(&filter, SUGGESTION_CANDIDATES)
            .await?;
        let ranked = rank_by_prefix(candidates, |doll| doll.name.as_str(), needle, limit as usize);
        self.decorate(ranked).await
    }

    /// Applies rename, move and link changes as one transaction, appending an
    /// event for each rename or move that actually changes something.
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: i64,
        changes: DollChanges,
    ) -> Result<DollView, AppError> {
        if changes.name.is_some() || changes.purchase_url.is_some() {
            user.require(Permission::DollRename)?;
        }
        if changes.touches_placement() {
            user.require(Permission::DollUpdateLocation)?;
        }
        let new_name = changes
            .name
            .as_deref()
            .map(|name| normalize_name(name, "Doll"))
            .transpose()?;

        let txn = self.db.begin().await?;
        let current = self.dolls.find_live(&txn, id).await?;
        let current_container = self.container_of(&txn, current.container_id).await?;

        let renamed = new_name.filter(|name| *name != current.name);
        let target = if changes.touches_placement() {
            Some(self.resolve_move_target(&txn, &current, &changes).await?)
        } else {
            None
        };
        let moved = target
            .as_ref()
            .filter(|target| Some(target.id) != current.container_id);
        let new_url = changes.purchase_url.map(normalize_url);
        let relinked = new_url.as_ref().filter(|url| **url != current.purchase_url);

        let mut result = current.clone();
        if renamed.is_some() || moved.is_some() || relinked.is_some() {
            let name_update = renamed.clone();
            let placement_update = moved
                .map(|target| (target.id, LegacyPlacement::for_container_name(&target.name)));
            let url_update = relinked.cloned();
            result = self
                .dolls
                .update(&txn, id, move |active: &mut doll::ActiveModel| {
                    if let Some(name) = name_update {
                        active.name = Set(name);
                    }
                    if let Some((container_id, placement)) = placement_update {
                        active.container_id = Set(Some(container_id));
                        active.location = Set(placement.location);
                        active.bag_number = Set(placement.bag_number);
                    }
                    if let Some(url) = url_update {
                        active.purchase_url = Set(url);
                    }
                })
                .await?;
        }

        if let Some(new_name) = &renamed {
            let payload = json!({ "old_name": current.name, "new_name": new_name });
            self.events
                .append(&txn, id, EventType::DollRenamed, &payload, &user.email)
                .await?;
            info!(doll_id = id, "doll renamed");
        }
        if let Some(target) = moved {
            let payload = json!({
                "old_container_id": current.container_id,
                "old_container_name": current_container.as_ref().map(|c| c.name.as_str()),
                "new_container_id": target.id,
                "new_container_name": target.name,
                "old_location": current.location,
                "old_bag_number": current.bag_number,
                "new_location": result.location,
                "new_bag_number": result.bag_number,
            });
            self.events
                .append(&txn, id, EventType::DollMoved, &payload, &user.email)
                .await?;
            info!(doll_id = id, to = %target.name, "doll moved");
        }

        let primary = self.photos.find_primary(&txn, id).await?;
        txn.commit().await?;

        Ok(DollView {
            doll: result,
            container: moved.cloned().or(current_container),
            primary_photo_path: primary.map(|photo| photo.path),
        })
    }

    /// Soft delete. Events and photos stay.
    pub async fn delete(&self, user: &CurrentUser, id: i64) -> Result<(), AppError> {
        user.require(Permission::DollDelete)?;

        let txn = self.db.begin().await?;
        let current = self.dolls.find_live(&txn, id).await?;
        let deleted_by = user.email.clone();
        self.dolls
            .update(&txn, id, move |active: &mut doll::ActiveModel| {
                active.deleted_at = Set(Some(Utc::now().fixed_offset()));
                active.deleted_by = Set(Some(deleted_by));
            })
            .await?;
        let payload = json!({ "name": current.name });
        self.events
            .append(&txn, id, EventType::DollDeleted, &payload, &user.email)
            .await?;
        txn.commit().await?;

        info!(doll_id = id, "doll soft-deleted");
        Ok(())
    }

    async fn resolve_move_target<C: ConnectionTrait>(
        &self,
        conn: &C,
        current: &doll::Model,
        changes: &DollChanges,
    ) -> Result<container::Model, AppError> {
        if let Some(container_id) = changes.container_id {
            return self.active_container(conn, container_id).await;
        }
        let bag_number = match changes.location {
            Some(LegacyLocation::Home) => None,
            Some(LegacyLocation::Bag) => Some(changes.bag_number.or(current.bag_number).ok_or_else(
                || AppError::bad_request("bag_number is required when location is BAG"),
            )?),
            None => changes.bag_number,
        };
        let location = changes.location.or(bag_number.map(|_| LegacyLocation::Bag));
        match legacy_selector(location, bag_number)? {
            Some(LegacySelector::Container(name)) => self.active_container_named(conn, &name).await,
            _ => Err(AppError::bad_request("container_id or location is required")),
        }
    }

    /// Folds a legacy location filter into `filter`. `None` when it names a
    /// container that does not exist, so nothing can match.
    async fn narrow_by_legacy(
        &self,
        mut filter: DollFilter,
        location: Option<LegacyLocation>,
        bag_number: Option<i32>,
    ) -> Result<Option<DollFilter>, AppError> {
        match legacy_selector(location, bag_number)? {
            None => Ok(Some(filter)),
            Some(LegacySelector::AnyBag) => {
                filter.location = Some(LegacyLocation::Bag);
                Ok(Some(filter))
            }
            Some(LegacySelector::Container(name)) => {
                let found = self
                    .containers
                    .find_active_by_name(self.containers.db(), &name, None)
                    .await?;
                match found {
                    Some(container) if filter.container_id.is_none_or(|id| id == container.id) => {
                        filter.container_id = Some(container.id);
                        Ok(Some(filter))
                    }
                    _ => Ok(None),
                }
            }
        }
    }

    async fn active_container<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i64,
    ) -> Result<container::Model, AppError> {
        self.containers
            .find_active(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Container {id} not found")))
    }

    async fn active_container_named<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
    ) -> Result<container::Model, AppError> {
        self.containers
            .find_active_by_name(conn, name, None)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Container '{name}' not found")))
    }

    async fn container_of<C: ConnectionTrait>(
        &self,
        conn: &C,
        container_id: Option<i64>,
    ) -> Result<Option<container::Model>, AppError> {
        let Some(container_id) = container_id else {
            return Ok(None);
        };
        match self.containers.find_by_id(conn, container_id).await {
            Ok(container) => Ok(Some(container)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn decorate(&self, dolls: Vec<doll::Model>) -> Result<Vec<DollView>, AppError> {
        let container_ids: Vec<i64> = dolls
            .iter()
            .filter_map(|doll| doll.container_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let doll_ids: Vec<i64> = dolls.iter().map(|doll| doll.id).collect();

        let containers = self.containers.find_by_ids(&container_ids).await?;
        let mut primary_paths: HashMap<i64, String> = self.photos.primary_paths(&doll_ids).await?;

        Ok(dolls
            .into_iter()
            .map(|doll| DollView {
                container: doll.container_id.and_then(|id| containers.get(&id).cloned()),
                primary_photo_path: primary_paths.remove(&doll.id),
                doll,
            })
            .collect())
    }
}
