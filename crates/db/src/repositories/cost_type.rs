//! Cost type repository.

use async_trait::async_trait;
use claimflow_core::cost_type::{CatalogError, CostType, CostTypeRepository as CostTypeRepoTrait};
use dashmap::DashMap;

/// Cost type repository implementation.
#[derive(Debug, Default)]
pub struct CostTypeRepository {
    cost_types: DashMap<String, CostType>,
}

impl CostTypeRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a cost type.
    pub fn upsert(&self, cost_type: CostType) {
        self.cost_types.insert(cost_type.id.clone(), cost_type);
    }
}

#[async_trait]
impl CostTypeRepoTrait for CostTypeRepository {
    async fn find(&self, id: &str) -> Result<Option<CostType>, CatalogError> {
        Ok(self.cost_types.get(id).map(|row| row.value().clone()))
    }

    async fn list(&self) -> Result<Vec<CostType>, CatalogError> {
        let mut cost_types: Vec<CostType> =
            self.cost_types.iter().map(|row| row.value().clone()).collect();
        cost_types.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(cost_types)
    }
}
