use crate::model::ids::TopicId;
use crate::model::status::ProgressStatus;
use crate::model::topic::TopicNode;

/// A catalog node with its status resolved against the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    id: TopicId,
    title: String,
    description: String,
    status: ProgressStatus,
    children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub(crate) fn resolved(
        topic: &TopicNode,
        status: ProgressStatus,
        children: Vec<DisplayNode>,
    ) -> Self {
        Self {
            id: topic.id().clone(),
            title: topic.title().to_owned(),
            description: topic.description().to_owned(),
            status,
            children,
        }
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
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    #[must_use]
    pub fn children(&self) -> &[DisplayNode] {
        &self.children
    }
}

/// The in-memory tree shown to the user.
///
/// Shape and content come from the catalog; only `status` is mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayTree {
    roots: Vec<DisplayNode>,
}

impl DisplayTree {
    #[must_use]
    pub fn new(roots: Vec<DisplayNode>) -> Self {
        Self { roots }
    }

    #[must_use]
    pub fn roots(&self) -> &[DisplayNode] {
        &self.roots
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&DisplayNode> {
        fn find_in<'a>(nodes: &'a [DisplayNode], id: &str) -> Option<&'a DisplayNode> {
            nodes.iter().find_map(|node| {
                if node.id.as_str() == id {
                    Some(node)
                } else {
                    find_in(&node.children, id)
                }
            })
        }
        find_in(&self.roots, id)
    }

    #[must_use]
    pub fn find_mut(&mut self, id: &str) -> Option<&mut DisplayNode> {
        fn find_in<'a>(nodes: &'a mut [DisplayNode], id: &str) -> Option<&'a mut DisplayNode> {
            for node in nodes {
                if node.id.as_str() == id {
                    return Some(node);
                }
                if let Some(found) = find_in(&mut node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        find_in(&mut self.roots, id)
    }

    /// Set the status of one node, wherever it sits in the tree.
    ///
    /// Returns the previous status, or `None` if no node has this id.
    pub fn set_status(&mut self, id: &str, status: ProgressStatus) -> Option<ProgressStatus> {
        let node = self.find_mut(id)?;
        Some(std::mem::replace(&mut node.status, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Catalog, ProgressSnapshot};

    fn topic(id: &str) -> TopicNode {
        TopicNode::new(TopicId::new(id).unwrap(), id)
    }

    fn tree() -> DisplayTree {
        let catalog = Catalog::new(vec![
            topic("m1").with_children(vec![topic("t1").with_children(vec![topic("s1")])]),
            topic("m2"),
        ])
        .unwrap();
        crate::merge(&catalog, &ProgressSnapshot::empty())
    }

    #[test]
    fn set_status_reaches_deep_nodes() {
        let mut tree = tree();
        let previous = tree.set_status("s1", ProgressStatus::Completed);
        assert_eq!(previous, Some(ProgressStatus::NotStarted));
        assert_eq!(tree.find("s1").unwrap().status(), ProgressStatus::Completed);
        assert_eq!(tree.find("t1").unwrap().status(), ProgressStatus::NotStarted);
    }

    #[test]
    fn set_status_on_unknown_id_is_a_no_op() {
        let mut tree = tree();
        let before = tree.clone();
        assert_eq!(tree.set_status("ghost", ProgressStatus::Completed), None);
        assert_eq!(tree, before);
    }
}
