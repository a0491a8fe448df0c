use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use offer_estimator::error::AppError;
use offer_estimator::workflows::buyers::{BuyerProfile, BuyerRepository, BuyerStoreError};
use offer_estimator::workflows::saved_estimates::{
    RepositoryError, SavedEstimate, SavedEstimateId, SavedEstimateRepository,
};
use offer_estimator::workflows::underwrite::StaticReferenceStore;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySavedEstimateRepository {
    records: Arc<Mutex<HashMap<SavedEstimateId, SavedEstimate>>>,
}

impl SavedEstimateRepository for InMemorySavedEstimateRepository {
    fn insert(&self, record: SavedEstimate) -> Result<SavedEstimate, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: SavedEstimate) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: SavedEstimateId) -> Result<Option<SavedEstimate>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    fn list_for_user(&self, user_id: u64) -> Result<Vec<SavedEstimate>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect())
    }

    fn delete(&self, id: SavedEstimateId) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.remove(&id).is_some())
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("saved estimate mutex poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBuyerRepository {
    buyers: Arc<Mutex<BTreeMap<u64, BuyerProfile>>>,
}

impl InMemoryBuyerRepository {
    pub(crate) fn with_buyers(buyers: Vec<BuyerProfile>) -> Self {
        let buyers = buyers.into_iter().map(|buyer| (buyer.id, buyer)).collect();
        Self {
            buyers: Arc::new(Mutex::new(buyers)),
        }
    }

    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let buyers: Vec<BuyerProfile> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        info!(count = buyers.len(), path = %path.display(), "seeded buyer list");
        Ok(Self::with_buyers(buyers))
    }
}

impl BuyerRepository for InMemoryBuyerRepository {
    fn all(&self) -> Result<Vec<BuyerProfile>, BuyerStoreError> {
        let guard = self
            .buyers
            .lock()
            .map_err(|_| BuyerStoreError::Unavailable("buyer mutex poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    fn fetch(&self, id: u64) -> Result<Option<BuyerProfile>, BuyerStoreError> {
        let guard = self
            .buyers
            .lock()
            .map_err(|_| BuyerStoreError::Unavailable("buyer mutex poisoned".to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}

/// Reference tables from `path`, or an empty store whose lookups fall back to
/// the built-in underwriting values.
pub(crate) fn load_reference_store(path: Option<&Path>) -> Result<StaticReferenceStore, AppError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading underwriting reference tables");
            Ok(StaticReferenceStore::from_path(path)?)
        }
        None => {
            info!("no REFERENCE_DATA_PATH configured, using built-in underwriting values");
            Ok(StaticReferenceStore::default())
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
