#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod progress_store;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressServiceError, ProgressStoreError};
pub use progress_service::{LifecyclePhase, ProgressService};
pub use progress_store::{ProgressStore, ProgressStoreConfig, SlotProgressStore};
