//! Project a tree back into a persistable snapshot.

use crate::model::{
    DisplayNode, ProgressEntries, ProgressEntry, ProgressSnapshot, ProgressStatus, TopicId,
    TopicNode,
};

/// A tree node that carries a status.
pub trait ProgressNode: Sized {
    fn id(&self) -> &TopicId;
    fn status(&self) -> ProgressStatus;
    fn children(&self) -> &[Self];
}

impl ProgressNode for DisplayNode {
    fn id(&self) -> &TopicId {
        DisplayNode::id(self)
    }

    fn status(&self) -> ProgressStatus {
        DisplayNode::status(self)
    }

    fn children(&self) -> &[Self] {
        DisplayNode::children(self)
    }
}

/// A catalog node reports its default, so extracting the catalog yields the
/// snapshot of a learner who has not changed anything.
impl ProgressNode for TopicNode {
    fn id(&self) -> &TopicId {
        TopicNode::id(self)
    }

    fn status(&self) -> ProgressStatus {
        self.default_status()
    }

    fn children(&self) -> &[Self] {
        TopicNode::children(self)
    }
}

/// Capture the status of every node, at every depth.
///
/// Titles, descriptions and other content are never written; the catalog stays
/// their only source.
#[must_use]
pub fn extract<N: ProgressNode>(nodes: &[N]) -> ProgressSnapshot {
    ProgressSnapshot::from_entries(extract_level(nodes))
}

fn extract_level<N: ProgressNode>(nodes: &[N]) -> ProgressEntries {
    nodes
        .iter()
        .map(|node| {
            let entry = ProgressEntry::with_status(node.status())
                .with_children(extract_level(node.children()));
            (node.id().clone(), entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge;
    use crate::model::Catalog;

    fn id(raw: &str) -> TopicId {
        TopicId::new(raw).unwrap()
    }

    fn deep_catalog() -> Catalog {
        let mut node = TopicNode::new(id("level-5"), "Level 5");
        for depth in (1..5).rev() {
            node = TopicNode::new(id(&format!("level-{depth}")), format!("Level {depth}"))
                .with_children(vec![node]);
        }
        Catalog::new(vec![node]).unwrap()
    }

    #[test]
    fn extracts_every_depth() {
        let catalog = deep_catalog();
        let mut tree = merge(&catalog, &ProgressSnapshot::empty());
        tree.set_status("level-5", ProgressStatus::Completed);

        let snapshot = extract(tree.roots());
        let mut entry = snapshot.get("level-1").unwrap();
        for depth in 2..=5 {
            entry = entry.children().get(format!("level-{depth}").as_str()).unwrap();
        }
        assert_eq!(entry.status(), Some(ProgressStatus::Completed));
        assert_eq!(merge(&catalog, &snapshot), tree);
    }

    #[test]
    fn extracting_the_catalog_records_defaults() {
        let catalog = Catalog::new(vec![
            TopicNode::new(id("m1"), "M1")
                .with_default_status(ProgressStatus::InProgress)
                .with_children(vec![TopicNode::new(id("s1"), "S1")]),
        ])
        .unwrap();

        let snapshot = extract(catalog.modules());
        let m1 = snapshot.get("m1").unwrap();
        assert_eq!(m1.status(), Some(ProgressStatus::InProgress));
        assert_eq!(
            m1.children().get("s1").unwrap().status(),
            Some(ProgressStatus::NotStarted)
        );
        assert_eq!(extract(merge(&catalog, &ProgressSnapshot::empty()).roots()), snapshot);
    }

    #[test]
    fn never_writes_content_fields() {
        let catalog = Catalog::new(vec![
            TopicNode::new(id("m1"), "A title").with_description("A description"),
        ])
        .unwrap();
        let json = extract(merge(&catalog, &ProgressSnapshot::empty()).roots())
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"m1":{"status":"not-started"}}"#);
    }
}
