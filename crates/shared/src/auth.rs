//! Caller identity derived from bearer tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth scopes that gate the approver roles.
pub mod scopes {
    /// Line managers approving their reports' claims.
    pub const MANAGER: &str = "manager.write";
    /// Lease coordinators approving lease-related claims.
    pub const LEASE_COORDINATOR: &str = "leasecoordinator.write";
    /// Creditor administration (final approval, exports).
    pub const CREDITOR: &str = "creditor.write";
    /// Financial controllers.
    pub const CONTROLLER: &str = "controller.write";
    /// Finance department scope, implies [`CREDITOR`].
    pub const FINANCE: &str = "finance.expenses";
}

/// JWT claims as issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier.
    pub sub: String,
    /// User principal name (the employee's email address).
    pub unique_name: String,
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a caller expiring at `expires_at`.
    #[must_use]
    pub fn new(caller: &Caller, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: caller.email.clone(),
            unique_name: caller.email.clone(),
            given_name: caller.given_name.clone(),
            family_name: caller.family_name.clone(),
            name: Some(caller.display_name.clone()),
            scopes: caller.scopes.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Converts the claims into the identity passed to the core.
    #[must_use]
    pub fn into_caller(self) -> Caller {
        let mut granted = self.scopes;
        if granted.iter().any(|s| s == scopes::FINANCE)
            && !granted.iter().any(|s| s == scopes::CREDITOR)
        {
            granted.push(scopes::CREDITOR.to_string());
        }

        let display_name = self.name.unwrap_or_else(|| self.unique_name.clone());
        Caller {
            email: self.unique_name,
            given_name: self.given_name,
            family_name: self.family_name,
            display_name,
            scopes: granted,
        }
    }
}

/// The authenticated caller of a core operation.
///
/// Trusted verbatim; built once at the API boundary and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Email / UPN, the key into the employee directory.
    pub email: String,
    /// Given name.
    pub given_name: Option<String>,
    /// Family name.
    pub family_name: Option<String>,
    /// Display name.
    pub display_name: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl Caller {
    /// Creates a caller without scopes.
    #[must_use]
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            given_name: None,
            family_name: None,
            display_name: display_name.into(),
            scopes: Vec::new(),
        }
    }

    /// Adds a scope.
    #[must_use]
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scopes.push(scope.to_string());
        self
    }

    /// Returns true if the caller holds `scope`.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Audit identity recorded in journal entries.
    #[must_use]
    pub fn audit_name(&self) -> &str {
        &self.email
    }
}
