//! Investor buyer list used to match estimates with likely purchasers.

pub mod router;

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub use router::buyer_router;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub id: u64,
    pub company_name: String,
    /// Free-form buy box (markets, price band, property types).
    #[serde(default)]
    pub investor_profile: Value,
    #[serde(default)]
    pub purchases_last_12_months: u32,
    pub active: bool,
}

pub trait BuyerRepository: Send + Sync {
    fn all(&self) -> Result<Vec<BuyerProfile>, BuyerStoreError>;
    fn fetch(&self, id: u64) -> Result<Option<BuyerProfile>, BuyerStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BuyerStoreError {
    #[error("buyer store unavailable: {0}")]
    Unavailable(String),
}

pub struct BuyerMatchingService<R> {
    repository: Arc<R>,
}

impl<R> BuyerMatchingService<R>
where
    R: BuyerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Active buyers, one per company: the profile with the most purchases in
    /// the last twelve months. Ordered by company name.
    pub fn active_buyers(&self) -> Result<Vec<BuyerProfile>, BuyerError> {
        let mut buyers: Vec<BuyerProfile> = self
            .repository
            .all()?
            .into_iter()
            .filter(|buyer| buyer.active)
            .collect();
        buyers.sort_by(|a, b| {
            a.company_name
                .cmp(&b.company_name)
                .then_with(|| b.purchases_last_12_months.cmp(&a.purchases_last_12_months))
                .then_with(|| a.id.cmp(&b.id))
        });
        buyers.dedup_by(|later, kept| later.company_name == kept.company_name);

        info!(count = buyers.len(), "loaded active buyers");
        Ok(buyers)
    }

    pub fn get(&self, id: u64) -> Result<BuyerProfile, BuyerError> {
        self.repository.fetch(id)?.ok_or(BuyerError::NotFound(id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuyerError {
    #[error("buyer {0} not found")]
    NotFound(u64),
    #[error(transparent)]
    Store(#[from] BuyerStoreError),
}

impl BuyerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BuyerError::NotFound(_) => StatusCode::NOT_FOUND,
            BuyerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
