//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::model::{CatalogError, StatusError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted when writing a progress snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize progress: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("progress has not been loaded yet")]
    NotReady,
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error(transparent)]
    Store(#[from] ProgressStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
