use crate::{
    auth::{CurrentUser, Permission},
    db::{
        dao::{DaoBase, DollDao, EventDao, PaginatedResponse, Pagination},
        entities::event,
    },
    error::AppError,
};

pub const DOLL_EVENTS_DEFAULT_LIMIT: u64 = 20;
pub const DOLL_EVENTS_MAX_LIMIT: u64 = 100;
pub const ALL_EVENTS_DEFAULT_LIMIT: u64 = 50;
pub const ALL_EVENTS_MAX_LIMIT: u64 = 200;

#[derive(Clone)]
pub struct EventService {
    events: EventDao,
    dolls: DollDao,
}

impl EventService {
    pub fn new(events: EventDao, dolls: DollDao) -> Self {
        Self { events, dolls }
    }

    /// History of one doll, including soft-deleted ones.
    pub async fn list_for_doll(
        &self,
        user: &CurrentUser,
        doll_id: i64,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<PaginatedResponse<event::Model>, AppError> {
        user.require(Permission::EventRead)?;
        let pagination = Pagination::bounded(
            limit,
            offset,
            DOLL_EVENTS_DEFAULT_LIMIT,
            DOLL_EVENTS_MAX_LIMIT,
        )?;
        self.dolls.find_by_id(self.dolls.db(), doll_id).await?;
        Ok(self.events.list_for_doll(doll_id, pagination).await?)
    }

    pub async fn list_all(
        &self,
        user: &CurrentUser,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<PaginatedResponse<event::Model>, AppError> {
        user.require(Permission::EventRead)?;
        let pagination =
            Pagination::bounded(limit, offset, ALL_EVENTS_DEFAULT_LIMIT, ALL_EVENTS_MAX_LIMIT)?;
        Ok(self.events.list_all(pagination).await?)
    }
}
