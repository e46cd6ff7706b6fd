mod display;
mod ids;
pub mod snapshot;
mod status;
mod topic;

pub use display::{DisplayNode, DisplayTree};
pub use ids::{TopicId, TopicIdError};
pub use snapshot::{ProgressEntries, ProgressEntry, ProgressSnapshot, SnapshotError};
pub use status::{ProgressStatus, StatusAction, StatusError};
pub use topic::{Catalog, CatalogError, TopicNode};
