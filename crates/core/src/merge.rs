//! Overlay a persisted snapshot onto the catalog.

use crate::model::{
    Catalog, DisplayNode, DisplayTree, ProgressEntries, ProgressSnapshot, TopicNode,
};

/// Resolve every catalog node's status against `snapshot`.
///
/// The catalog decides which nodes exist; snapshot entries without a matching
/// catalog node at the same level are ignored. A node without an override
/// keeps its `default_status`.
#[must_use]
pub fn merge(catalog: &Catalog, snapshot: &ProgressSnapshot) -> DisplayTree {
    DisplayTree::new(merge_level(catalog.modules(), Some(snapshot.entries())))
}

fn merge_level(nodes: &[TopicNode], entries: Option<&ProgressEntries>) -> Vec<DisplayNode> {
    nodes
        .iter()
        .map(|node| {
            let entry = entries.and_then(|level| level.get(node.id()));
            let status = entry
                .and_then(|e| e.status())
                .unwrap_or_else(|| node.default_status());
            let children = merge_level(node.children(), entry.map(|e| e.children()));
            DisplayNode::resolved(node, status, children)
        })
        .collect()
}
