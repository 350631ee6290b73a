use std::env::VarError;

use campus_erp_ledger::StoreError;
use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::deadpool;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("DATABASE_URL is not usable: {0}")]
    DatabaseEnvUrl(#[from] VarError),
    #[error("Failed to create database pool {0}")]
    PoolBuild(#[from] deadpool::BuildError),
    #[error("Database pool failed {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("Database query failed {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Stored attendance records are malformed {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown admission status {0:?}")]
    UnknownStatus(String),
    #[error("Row changed concurrently")]
    Conflict,
}

impl From<DatabaseError> for StoreError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::Conflict
            | DatabaseError::Database(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::SerializationFailure,
                _,
            )) => Self::Conflict,
            other => Self::Unavailable(other.to_string()),
        }
    }
}
