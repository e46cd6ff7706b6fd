use crate::model::{DisplayNode, DisplayTree, ProgressStatus};

/// Status counts for a display tree, as shown in the progress sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total: u32,
    pub not_started: u32,
    pub in_progress: u32,
    pub completed: u32,
}

impl ProgressSummary {
    /// Count only the top-level modules.
    #[must_use]
    pub fn of_modules(tree: &DisplayTree) -> Self {
        let mut summary = Self::default();
        for node in tree.roots() {
            summary.record(node.status());
        }
        summary
    }

    /// Count every node at every depth.
    #[must_use]
    pub fn of_tree(tree: &DisplayTree) -> Self {
        fn walk(nodes: &[DisplayNode], summary: &mut ProgressSummary) {
            for node in nodes {
                summary.record(node.status());
                walk(node.children(), summary);
            }
        }
        let mut summary = Self::default();
        walk(tree.roots(), &mut summary);
        summary
    }

    fn record(&mut self, status: ProgressStatus) {
        self.total += 1;
        match status {
            ProgressStatus::NotStarted => self.not_started += 1,
            ProgressStatus::InProgress => self.in_progress += 1,
            ProgressStatus::Completed => self.completed += 1,
        }
    }

    /// Completed share of the total, rounded down. An empty tree is 0%.
    #[must_use]
    pub fn percent_complete(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.completed) * 100 / u64::from(self.total);
        u8::try_from(pct).unwrap_or(100)
    }
}
