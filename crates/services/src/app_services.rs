use std::sync::Arc;

use progress_core::model::Catalog;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::progress_store::{ProgressStore, ProgressStoreConfig, SlotProgressStore};

/// Assembles app-facing services around one catalog and one progress slot.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    store: Arc<dyn ProgressStore>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog is invalid or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        catalog_json: &str,
        config: ProgressStoreConfig,
    ) -> Result<Self, AppServicesError> {
        let catalog = Catalog::from_json(catalog_json)?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_parts(catalog, &storage, config))
    }

    #[must_use]
    pub fn from_parts(catalog: Catalog, storage: &Storage, config: ProgressStoreConfig) -> Self {
        let store: Arc<dyn ProgressStore> =
            Arc::new(SlotProgressStore::new(config, Arc::clone(&storage.slots)));
        Self {
            catalog: Arc::new(catalog),
            store,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// A fresh session in the loading phase; call `start` before use.
    #[must_use]
    pub fn progress_service(&self) -> ProgressService {
        ProgressService::new(Arc::clone(&self.catalog), Arc::clone(&self.store))
    }
}
