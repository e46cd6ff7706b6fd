#![forbid(unsafe_code)]

pub mod extract;
pub mod merge;
pub mod model;
pub mod summary;

pub use extract::{ProgressNode, extract};
pub use merge::merge;
pub use summary::ProgressSummary;
