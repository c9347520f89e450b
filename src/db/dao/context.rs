use sea_orm::DatabaseConnection;

use super::{ContainerDao, DaoBase, DollDao, EventDao, PhotoDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn container(&self) -> ContainerDao {
        DaoBase::new(&self.db)
    }

    pub fn doll(&self) -> DollDao {
        DaoBase::new(&self.db)
    }

    pub fn event(&self) -> EventDao {
        DaoBase::new(&self.db)
    }

    pub fn photo(&self) -> PhotoDao {
        DaoBase::new(&self.db)
    }
}
