use sea_orm::DatabaseConnection;

use crate::{
    db::dao::DaoContext,
    services::{
        container_service::ContainerService, doll_service::DollService,
        event_service::EventService, photo_service::PhotoService,
    },
    state::AppState,
    storage::PhotoStorage,
};

#[derive(Clone)]
pub struct ServiceContext {
    db: DatabaseConnection,
    daos: DaoContext,
    storage: PhotoStorage,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection, storage: PhotoStorage) -> Self {
        Self {
            db: db.clone(),
            daos: DaoContext::new(db),
            storage,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db, state.storage.clone())
    }

    pub fn containers(&self) -> ContainerService {
        ContainerService::new(self.db.clone(), self.daos.container(), self.daos.doll())
    }

    pub fn dolls(&self) -> DollService {
        DollService::new(
            self.db.clone(),
            self.daos.doll(),
            self.daos.container(),
            self.daos.event(),
            self.daos.photo(),
        )
    }

    pub fn photos(&self) -> PhotoService {
        PhotoService::new(
            self.db.clone(),
            self.daos.doll(),
            self.daos.photo(),
            self.daos.event(),
            self.storage.clone(),
        )
    }

    pub fn events(&self) -> EventService {
        EventService::new(self.daos.event(), self.daos.doll())
    }
}
