//! Per-user bookmarks of estimates, including client-side offer adjustments.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{NewSavedEstimate, SavedEstimate, SavedEstimateId, SavedEstimateUpdate};
pub use repository::{RepositoryError, SavedEstimateRepository};
pub use router::saved_estimate_router;
pub use service::{SavedEstimateError, SavedEstimateService};
