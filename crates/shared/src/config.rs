//! Application configuration management.

use std::path::PathBuf;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Blob storage for attachments and export artifacts.
    pub storage: StorageProvider,
    /// Business rule toggles.
    #[serde(default)]
    pub rules: BusinessRulesConfig,
    /// Organization constants used by the export files.
    #[serde(default)]
    pub organization: OrganizationConfig,
    /// Optional JSON file with cost types and employees to preload.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Shared secret used to verify bearer tokens.
    pub secret: String,
    /// Lifetime of tokens issued for development use, in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory (tests only, contents are lost on restart)
    Memory,
}

impl StorageProvider {
    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

/// Toggles and parameters of the business rule engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRulesConfig {
    /// Per-company minimum claim amount.
    #[serde(default)]
    pub minimum_amount: MinimumAmountRule,
    /// Reject submissions from employees whose employment has ended.
    #[serde(default = "enabled")]
    pub active_employment: bool,
    /// Flag claims that look like duplicates of earlier claims.
    #[serde(default = "enabled")]
    pub duplicate_detection: bool,
}

impl Default for BusinessRulesConfig {
    fn default() -> Self {
        Self {
            minimum_amount: MinimumAmountRule::default(),
            active_employment: true,
            duplicate_detection: true,
        }
    }
}

/// Minimum amount rule: claims of `company` must exceed `floor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimumAmountRule {
    /// Whether the rule is evaluated.
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Company name as it appears in the HR record.
    pub company: String,
    /// Amounts less than or equal to this value are rejected.
    pub floor: Decimal,
}

impl Default for MinimumAmountRule {
    fn default() -> Self {
        Self {
            enabled: true,
            company: "VW TELECOM BV PAO".to_string(),
            floor: Decimal::TEN,
        }
    }
}

fn enabled() -> bool {
    true
}

/// The paying organization as it appears in the export files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    /// Name used as initiating party and debtor.
    pub company_name: String,
    /// Debtor IBAN.
    pub iban: String,
    /// Debtor BIC.
    pub bic: String,
    /// Prefix of the payment message id, followed by `/{run_id}`.
    #[serde(default = "default_message_id_prefix")]
    pub message_id_prefix: String,
    /// Time zone used for document dates and the execution date.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Fixed booking file columns.
    #[serde(default)]
    pub booking: BookingConstants,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            company_name: "VWT BV".to_string(),
            iban: "NL00BANK0000000000".to_string(),
            bic: "BANKNL2A".to_string(),
            message_id_prefix: default_message_id_prefix(),
            timezone: default_timezone(),
            booking: BookingConstants::default(),
        }
    }
}

fn default_message_id_prefix() -> String {
    "200/DEC".to_string()
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Amsterdam
}

/// Source and target constants written on every booking row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConstants {
    /// `Bron-bedrijfs-nummer`.
    pub source_company_number: String,
    /// `Bron gr boekrek`.
    pub source_ledger_account: String,
    /// `Bron Org Code`.
    pub source_org_code: String,
    /// `Doel-bedrijfs-nummer`.
    pub target_company_number: String,
    /// `Doel Org code`.
    pub target_org_code: String,
}

impl Default for BookingConstants {
    fn default() -> Self {
        Self {
            source_company_number: "200".to_string(),
            source_ledger_account: "114310".to_string(),
            source_org_code: "0000000".to_string(),
            target_company_number: "200".to_string(),
            target_org_code: "0000000".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CLAIMFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
