use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::domain::{NewSavedEstimate, SavedEstimate, SavedEstimateId, SavedEstimateUpdate};
use super::repository::{RepositoryError, SavedEstimateRepository};

/// Save, search and edit a user's bookmarked estimates.
pub struct SavedEstimateService<R> {
    repository: Arc<R>,
    sequence: AtomicU64,
}

impl<R> SavedEstimateService<R>
where
    R: SavedEstimateRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> SavedEstimateId {
        SavedEstimateId(self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    pub fn save(&self, draft: NewSavedEstimate) -> Result<SavedEstimate, SavedEstimateError> {
        let user_id = draft
            .user_id
            .ok_or(SavedEstimateError::MissingField("user_id"))?;
        let property_address = draft
            .property_address
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .ok_or(SavedEstimateError::MissingField("property_address"))?;
        let estimate_data = match draft.estimate_data {
            Some(Value::Object(data)) => data,
            Some(Value::Null) | None => {
                return Err(SavedEstimateError::MissingField("estimate_data"))
            }
            Some(_) => return Err(SavedEstimateError::InvalidEstimateData),
        };

        let now = Utc::now();
        let record = SavedEstimate {
            id: self.next_id(),
            user_id,
            property_address,
            estimate_data,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        info!(
            estimate_id = %stored.id,
            user_id = stored.user_id,
            address = %stored.property_address,
            "saved estimate"
        );
        Ok(stored)
    }

    /// All estimates for a user, newest first.
    pub fn list_for_user(&self, user_id: u64) -> Result<Vec<SavedEstimate>, SavedEstimateError> {
        let mut records = self.repository.list_for_user(user_id)?;
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    /// Case-insensitive substring search over the address; a blank term lists
    /// everything.
    pub fn search(
        &self,
        user_id: u64,
        term: Option<&str>,
    ) -> Result<Vec<SavedEstimate>, SavedEstimateError> {
        let records = self.list_for_user(user_id)?;
        match term.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => Ok(records
                .into_iter()
                .filter(|record| record.matches_address(term))
                .collect()),
            None => Ok(records),
        }
    }

    pub fn get(&self, id: SavedEstimateId) -> Result<SavedEstimate, SavedEstimateError> {
        self.repository
            .fetch(id)?
            .ok_or(SavedEstimateError::NotFound(id))
    }

    pub fn update(
        &self,
        id: SavedEstimateId,
        update: SavedEstimateUpdate,
    ) -> Result<SavedEstimate, SavedEstimateError> {
        let mut record = self.get(id)?;

        if let Some(data) = update.estimate_data {
            record.merge_data(data);
        }
        if let Some(address) = update
            .property_address
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
        {
            record.property_address = address;
        }
        record.updated_at = Utc::now();

        match self.repository.update(record.clone()) {
            Ok(()) => {
                info!(estimate_id = %id, "updated saved estimate");
                Ok(record)
            }
            Err(RepositoryError::NotFound) => Err(SavedEstimateError::NotFound(id)),
            Err(other) => Err(other.into()),
        }
    }

    pub fn delete(&self, id: SavedEstimateId) -> Result<(), SavedEstimateError> {
        if self.repository.delete(id)? {
            info!(estimate_id = %id, "deleted saved estimate");
            Ok(())
        } else {
            Err(SavedEstimateError::NotFound(id))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SavedEstimateError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("estimate_data must be a JSON object")]
    InvalidEstimateData,
    #[error("saved estimate {0} not found")]
    NotFound(SavedEstimateId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SavedEstimateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SavedEstimateError::MissingField(_) | SavedEstimateError::InvalidEstimateData => {
                StatusCode::BAD_REQUEST
            }
            SavedEstimateError::NotFound(_) => StatusCode::NOT_FOUND,
            SavedEstimateError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            SavedEstimateError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
