use std::sync::Arc;

use async_trait::async_trait;
use progress_core::model::ProgressSnapshot;
use storage::repository::SlotRepository;

use crate::error::ProgressStoreError;

/// Default storage key for the progress snapshot.
pub const DEFAULT_SLOT: &str = "learning-progress";

/// Load/save boundary injected into `ProgressService`.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Read the persisted snapshot.
    ///
    /// Never fails: a missing slot, a read error or an unreadable blob all
    /// mean "no progress recorded yet" and yield an empty snapshot.
    async fn load(&self) -> ProgressSnapshot;

    /// Replace the persisted snapshot with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if the snapshot cannot be serialized or
    /// written. Failed writes are not retried.
    async fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), ProgressStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStoreConfig {
    pub slot: String,
}

impl Default for ProgressStoreConfig {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SLOT.to_owned(),
        }
    }
}

/// `ProgressStore` backed by one named slot of a `SlotRepository`.
#[derive(Clone)]
pub struct SlotProgressStore {
    slot: String,
    repo: Arc<dyn SlotRepository>,
}

impl SlotProgressStore {
    #[must_use]
    pub fn new(config: ProgressStoreConfig, repo: Arc<dyn SlotRepository>) -> Self {
        Self {
            slot: config.slot,
            repo,
        }
    }

    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }
}

#[async_trait]
impl ProgressStore for SlotProgressStore {
    async fn load(&self) -> ProgressSnapshot {
        let raw = match self.repo.get_item(&self.slot).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(slot = %self.slot, "no stored progress");
                return ProgressSnapshot::empty();
            }
            Err(err) => {
                tracing::warn!(slot = %self.slot, error = %err, "failed to read progress, starting fresh");
                return ProgressSnapshot::empty();
            }
        };

        match ProgressSnapshot::parse(&raw) {
            Ok(snapshot) => {
                tracing::debug!(slot = %self.slot, entries = snapshot.len(), "loaded progress");
                snapshot
            }
            Err(err) => {
                tracing::warn!(slot = %self.slot, error = %err, "discarding unreadable progress");
                ProgressSnapshot::empty()
            }
        }
    }

    async fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), ProgressStoreError> {
        let json = snapshot.to_json()?;
        self.repo.set_item(&self.slot, &json).await?;
        tracing::debug!(slot = %self.slot, bytes = json.len(), "saved progress");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::{ProgressEntry, ProgressStatus, TopicId};
    use storage::repository::{InMemoryRepository, StorageError};

    fn store(repo: &InMemoryRepository) -> SlotProgressStore {
        SlotProgressStore::new(ProgressStoreConfig::default(), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn missing_slot_loads_empty() {
        let repo = InMemoryRepository::new();
        assert!(store(&repo).load().await.is_empty());
    }

    #[tokio::test]
    async fn garbage_loads_empty() {
        let repo = InMemoryRepository::new();
        repo.set_item(DEFAULT_SLOT, "{{ definitely not json").await.unwrap();
        assert_eq!(store(&repo).load().await, ProgressSnapshot::empty());
    }

    struct FailingReads;

    #[async_trait]
    impl SlotRepository for FailingReads {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("database is locked".into()))
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn read_error_loads_empty() {
        let store = SlotProgressStore::new(ProgressStoreConfig::default(), Arc::new(FailingReads));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_returns_same_snapshot() {
        let repo = InMemoryRepository::new();
        let store = store(&repo);
        let mut snapshot = ProgressSnapshot::empty();
        snapshot.insert(
            TopicId::new("calculus").unwrap(),
            ProgressEntry::with_status(ProgressStatus::InProgress),
        );

        store.save(&snapshot).await.unwrap();
        assert_eq!(store.load().await, snapshot);
        assert_eq!(
            repo.get_item(DEFAULT_SLOT).await.unwrap().as_deref(),
            Some(r#"{"calculus":{"status":"in-progress"}}"#)
        );
    }

    #[tokio::test]
    async fn uses_configured_slot() {
        let repo = InMemoryRepository::new();
        let store = SlotProgressStore::new(
            ProgressStoreConfig {
                slot: "aws-progress".into(),
            },
            Arc::new(repo.clone()),
        );
        store.save(&ProgressSnapshot::empty()).await.unwrap();
        assert_eq!(store.slot(), "aws-progress");
        assert_eq!(repo.get_item("aws-progress").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(repo.get_item(DEFAULT_SLOT).await.unwrap(), None);
    }
}
