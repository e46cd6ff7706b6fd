use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::TopicId;
use crate::model::status::ProgressStatus;

/// One authored node of the content catalog (module, topic, sub-topic, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNode {
    id: TopicId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default_status: ProgressStatus,
    #[serde(default)]
    children: Vec<TopicNode>,
}

impl TopicNode {
    #[must_use]
    pub fn new(id: TopicId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            default_status: ProgressStatus::default(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_default_status(mut self, status: ProgressStatus) -> Self {
        self.default_status = status;
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<TopicNode>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn default_status(&self) -> ProgressStatus {
        self.default_status
    }

    #[must_use]
    pub fn children(&self) -> &[TopicNode] {
        &self.children
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate topic id: {0}")]
    DuplicateId(TopicId),

    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The immutable tree of topics shipped with the application.
///
/// Ids are unique across the whole tree, not just among siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    modules: Vec<TopicNode>,
}

impl Catalog {
    /// Build a catalog from its top-level modules.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if any id appears more than once.
    pub fn new(modules: Vec<TopicNode>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&TopicNode> = modules.iter().collect();
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id()) {
                return Err(CatalogError::DuplicateId(node.id().clone()));
            }
            stack.extend(node.children());
        }
        Ok(Self { modules })
    }

    /// Parse an authored catalog: a JSON array of topic nodes.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON or empty ids, and
    /// `CatalogError::DuplicateId` for repeated ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let modules: Vec<TopicNode> = serde_json::from_str(json)?;
        Self::new(modules)
    }

    #[must_use]
    pub fn modules(&self) -> &[TopicNode] {
        &self.modules
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[TopicNode]) -> usize {
            nodes.iter().map(|n| 1 + count(n.children())).sum()
        }
        count(&self.modules)
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&TopicNode> {
        fn find_in<'a>(nodes: &'a [TopicNode], id: &str) -> Option<&'a TopicNode> {
            nodes.iter().find_map(|node| {
                if node.id().as_str() == id {
                    Some(node)
                } else {
                    find_in(node.children(), id)
                }
            })
        }
        find_in(&self.modules, id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}
