//! Cached cost type lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;

use super::error::CatalogError;
use super::types::CostType;
use crate::expense::cost_type_id;

/// Default cache capacity (number of cost types).
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live for cached cost types (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Source of cost types.
///
/// Implemented by the db crate.
#[async_trait]
pub trait CostTypeRepository: Send + Sync {
    /// Finds a cost type by id.
    async fn find(&self, id: &str) -> Result<Option<CostType>, CatalogError>;

    /// Lists every cost type, active or not.
    async fn list(&self) -> Result<Vec<CostType>, CatalogError>;
}

/// Read-only cost type catalog with a short-lived cache in front of the
/// repository.
#[derive(Clone)]
pub struct CostTypeCatalog {
    repo: Arc<dyn CostTypeRepository>,
    cache: Cache<String, Arc<CostType>>,
}

impl CostTypeCatalog {
    /// Creates a catalog with default cache settings.
    #[must_use]
    pub fn new(repo: Arc<dyn CostTypeRepository>) -> Self {
        Self::with_config(repo, DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a catalog with custom cache settings.
    #[must_use]
    pub fn with_config(repo: Arc<dyn CostTypeRepository>, max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { repo, cache }
    }

    /// Finds the cost type a claim reference (`id` or `label:id`) points to.
    pub async fn find(&self, reference: &str) -> Result<Option<Arc<CostType>>, CatalogError> {
        let id = cost_type_id(reference);

        if let Some(cached) = self.cache.get(id) {
            return Ok(Some(cached));
        }

        let Some(cost_type) = self.repo.find(id).await? else {
            return Ok(None);
        };

        let cost_type = Arc::new(cost_type);
        self.cache.insert(id.to_string(), Arc::clone(&cost_type));
        Ok(Some(cost_type))
    }

    /// Resolves a reference that a claim may be (re)assigned to.
    ///
    /// # Errors
    ///
    /// `CatalogError::Unknown` or `CatalogError::Inactive` when the cost
    /// type cannot be chosen.
    pub async fn require_active(&self, reference: &str) -> Result<Arc<CostType>, CatalogError> {
        let cost_type = self
            .find(reference)
            .await?
            .ok_or_else(|| CatalogError::Unknown(reference.to_string()))?;

        if !cost_type.active {
            return Err(CatalogError::Inactive(reference.to_string()));
        }
        Ok(cost_type)
    }

    /// Ledger account booked for a claim reference.
    ///
    /// # Errors
    ///
    /// `CatalogError::Unknown` when the cost type does not exist.
    pub async fn ledger_account(&self, reference: &str) -> Result<String, CatalogError> {
        self.find(reference)
            .await?
            .map(|cost_type| cost_type.ledger_account.clone())
            .ok_or_else(|| CatalogError::Unknown(reference.to_string()))
    }

    /// Lists the cost types employees can choose from.
    pub async fn list_active(&self) -> Result<Vec<CostType>, CatalogError> {
        let mut cost_types: Vec<CostType> = self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|cost_type| cost_type.active)
            .collect();
        cost_types.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(cost_types)
    }

    /// Drops every cached entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
