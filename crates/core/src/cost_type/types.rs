//! Cost type definition.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expense::ManagerType;

/// A spending category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostType {
    /// Catalog id, as referenced by claims.
    pub id: String,
    /// General ledger ("grootboek") account booked on export.
    pub ledger_account: String,
    /// Inactive cost types cannot be chosen.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Claims below this amount skip the manager step (0 = never skip).
    #[serde(default = "default_min_amount")]
    pub min_amount: Decimal,
    /// Who approves the manager step.
    #[serde(default)]
    pub manager_type: ManagerType,
    /// Informational; claims are never approved automatically.
    #[serde(default)]
    pub auto_approve: bool,
    /// Label per locale.
    #[serde(default)]
    pub description: BTreeMap<String, String>,
}

fn default_active() -> bool {
    true
}

fn default_min_amount() -> Decimal {
    Decimal::from(50)
}

impl CostType {
    /// Creates an active line-manager cost type with the default minimum.
    #[must_use]
    pub fn new(id: impl Into<String>, ledger_account: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ledger_account: ledger_account.into(),
            active: true,
            min_amount: default_min_amount(),
            manager_type: ManagerType::default(),
            auto_approve: false,
            description: BTreeMap::new(),
        }
    }

    /// Sets the minimum amount.
    #[must_use]
    pub fn with_min_amount(mut self, min_amount: Decimal) -> Self {
        self.min_amount = min_amount;
        self
    }

    /// Sets the approver kind.
    #[must_use]
    pub fn with_manager_type(mut self, manager_type: ManagerType) -> Self {
        self.manager_type = manager_type;
        self
    }

    /// Marks the cost type inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
