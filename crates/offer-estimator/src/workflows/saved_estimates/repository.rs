use super::domain::{SavedEstimate, SavedEstimateId};

/// Storage abstraction for saved estimates.
pub trait SavedEstimateRepository: Send + Sync {
    fn insert(&self, record: SavedEstimate) -> Result<SavedEstimate, RepositoryError>;
    fn update(&self, record: SavedEstimate) -> Result<(), RepositoryError>;
    fn fetch(&self, id: SavedEstimateId) -> Result<Option<SavedEstimate>, RepositoryError>;
    fn list_for_user(&self, user_id: u64) -> Result<Vec<SavedEstimate>, RepositoryError>;
    /// Returns `false` when nothing was stored under `id`.
    fn delete(&self, id: SavedEstimateId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
