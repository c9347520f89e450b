pub mod base;
pub mod base_traits;
pub mod container_dao;
mod context;
pub mod doll_dao;
pub mod error;
pub mod event_dao;
pub mod photo_dao;

pub use base::{DaoBase, PaginatedResponse, Pagination};
pub use base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
pub use container_dao::ContainerDao;
pub use context::DaoContext;
pub use doll_dao::{DollDao, DollFilter};
pub use error::{DaoLayerError, DaoResult};
pub use event_dao::EventDao;
pub use photo_dao::PhotoDao;
