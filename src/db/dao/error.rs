use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Invalid pagination: limit={limit} offset={offset}")]
    InvalidPagination { limit: u64, offset: u64 },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
