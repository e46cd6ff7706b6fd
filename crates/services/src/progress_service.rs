use std::sync::Arc;

use progress_core::model::{Catalog, DisplayTree, ProgressStatus, StatusAction};
use progress_core::{ProgressSummary, extract, merge};

use crate::error::ProgressServiceError;
use crate::progress_store::ProgressStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Loading,
    Ready,
}

/// Owns the display tree for one session and keeps the store in sync with it.
///
/// Starts in the loading phase; `start` loads the snapshot once and moves to
/// ready. Every status change afterwards rewrites the whole snapshot. There is
/// no way back to loading: a new session needs a new service.
pub struct ProgressService {
    catalog: Arc<Catalog>,
    store: Arc<dyn ProgressStore>,
    // None while loading.
    tree: Option<DisplayTree>,
}

impl ProgressService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            catalog,
            store,
            tree: None,
        }
    }

    /// Load persisted progress and resolve the display tree.
    ///
    /// Only the first call touches the store; later calls return the tree
    /// already held in memory.
    pub async fn start(&mut self) -> &DisplayTree {
        match self.tree {
            Some(ref tree) => tree,
            None => {
                let snapshot = self.store.load().await;
                self.tree.insert(merge(&self.catalog, &snapshot))
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        if self.tree.is_some() {
            LifecyclePhase::Ready
        } else {
            LifecyclePhase::Loading
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn tree(&self) -> Option<&DisplayTree> {
        self.tree.as_ref()
    }

    /// Counts for the top-level modules.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::NotReady` before `start`.
    pub fn module_summary(&self) -> Result<ProgressSummary, ProgressServiceError> {
        self.tree()
            .map(ProgressSummary::of_modules)
            .ok_or(ProgressServiceError::NotReady)
    }

    /// Counts for every topic at every depth.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::NotReady` before `start`.
    pub fn tree_summary(&self) -> Result<ProgressSummary, ProgressServiceError> {
        self.tree()
            .map(ProgressSummary::of_tree)
            .ok_or(ProgressServiceError::NotReady)
    }

    /// Set the status of one topic and persist the whole tree.
    ///
    /// The in-memory tree keeps the new status even if the write fails.
    /// Returns the previous status.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::NotReady` before `start`,
    /// `ProgressServiceError::UnknownTopic` if no topic has this id, and
    /// `ProgressServiceError::Store` if the snapshot cannot be saved.
    pub async fn set_status(
        &mut self,
        id: &str,
        status: ProgressStatus,
    ) -> Result<ProgressStatus, ProgressServiceError> {
        let Some(tree) = self.tree.as_mut() else {
            return Err(ProgressServiceError::NotReady);
        };
        let previous = tree
            .set_status(id, status)
            .ok_or_else(|| ProgressServiceError::UnknownTopic(id.to_owned()))?;
        self.store.save(&extract(tree.roots())).await?;
        Ok(previous)
    }

    /// Apply a start/complete/reset action to one topic and persist.
    ///
    /// Returns the new status.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Status` if the action is not offered for
    /// the topic's current status, plus the errors of `set_status`.
    pub async fn apply_action(
        &mut self,
        id: &str,
        action: StatusAction,
    ) -> Result<ProgressStatus, ProgressServiceError> {
        let current = self
            .tree()
            .ok_or(ProgressServiceError::NotReady)?
            .find(id)
            .ok_or_else(|| ProgressServiceError::UnknownTopic(id.to_owned()))?
            .status();
        let next = current.apply(action)?;
        self.set_status(id, next).await?;
        Ok(next)
    }

    /// Rewrite the store from the current tree without changing anything.
    ///
    /// Entries for ids the catalog no longer has are dropped by this write.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::NotReady` before `start` and
    /// `ProgressServiceError::Store` if the snapshot cannot be saved.
    pub async fn flush(&self) -> Result<(), ProgressServiceError> {
        let tree = self.tree().ok_or(ProgressServiceError::NotReady)?;
        self.store.save(&extract(tree.roots())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use progress_core::model::{ProgressSnapshot, TopicId, TopicNode};
    use std::sync::Mutex;

    use crate::error::ProgressStoreError;

    #[derive(Default)]
    struct RecordingStore {
        initial: ProgressSnapshot,
        loads: Mutex<u32>,
        saved: Mutex<Vec<ProgressSnapshot>>,
    }

    #[async_trait]
    impl ProgressStore for RecordingStore {
        async fn load(&self) -> ProgressSnapshot {
            *self.loads.lock().unwrap() += 1;
            self.initial.clone()
        }

        async fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), ProgressStoreError> {
            self.saved.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    fn catalog() -> Arc<Catalog> {
        let id = |raw: &str| TopicId::new(raw).unwrap();
        Arc::new(
            Catalog::new(vec![
                TopicNode::new(id("m1"), "M1").with_children(vec![TopicNode::new(id("s1"), "S1")]),
                TopicNode::new(id("m2"), "M2"),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn loads_exactly_once() {
        let store = Arc::new(RecordingStore::default());
        let mut service = ProgressService::new(catalog(), store.clone());
        assert_eq!(service.phase(), LifecyclePhase::Loading);
        assert!(service.tree().is_none());

        service.start().await;
        service.start().await;
        assert_eq!(service.phase(), LifecyclePhase::Ready);
        assert_eq!(*store.loads.lock().unwrap(), 1);
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutations_before_start_are_rejected() {
        let store = Arc::new(RecordingStore::default());
        let mut service = ProgressService::new(catalog(), store.clone());
        let err = service
            .set_status("m1", ProgressStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::NotReady));
        assert!(matches!(
            service.module_summary(),
            Err(ProgressServiceError::NotReady)
        ));
        assert_eq!(*store.loads.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn every_mutation_saves_full_snapshot() {
        let store = Arc::new(RecordingStore::default());
        let mut service = ProgressService::new(catalog(), store.clone());
        service.start().await;

        service.set_status("s1", ProgressStatus::InProgress).await.unwrap();
        service.apply_action("s1", StatusAction::Complete).await.unwrap();

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 2);
        let last = saved.last().unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(
            last.get("m1").unwrap().children().get("s1").unwrap().status(),
            Some(ProgressStatus::Completed)
        );
        assert_eq!(
            last.get("m2").unwrap().status(),
            Some(ProgressStatus::NotStarted)
        );
    }

    #[tokio::test]
    async fn unknown_topic_does_not_save() {
        let store = Arc::new(RecordingStore::default());
        let mut service = ProgressService::new(catalog(), store.clone());
        service.start().await;

        let err = service
            .set_status("ghost", ProgressStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::UnknownTopic(id) if id == "ghost"));
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disallowed_action_leaves_tree_untouched() {
        let store = Arc::new(RecordingStore::default());
        let mut service = ProgressService::new(catalog(), store.clone());
        service.start().await;

        let err = service
            .apply_action("m2", StatusAction::Complete)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::Status(_)));
        assert_eq!(
            service.tree().unwrap().find("m2").unwrap().status(),
            ProgressStatus::NotStarted
        );
        assert!(store.saved.lock().unwrap().is_empty());
    }
}
