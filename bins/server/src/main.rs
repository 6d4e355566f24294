//! Claimflow API Server
//!
//! Main entry point for the expense claim service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimflow_api::{AppState, create_router};
use claimflow_core::attachment::BlobAttachmentStore;
use claimflow_core::cost_type::CostTypeCatalog;
use claimflow_core::expense::ExpenseService;
use claimflow_core::export::ExportPipeline;
use claimflow_core::notify::LogNotifier;
use claimflow_core::rules::BusinessRuleEngine;
use claimflow_core::storage::{StorageConfig, StorageService};
use claimflow_core::workflow::ExpenseStateMachine;
use claimflow_db::{Database, SeedData};
use claimflow_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Stores, optionally preloaded
    let db = Database::new();
    if let Some(path) = &config.seed_file {
        let summary = SeedData::from_file(path).await?.apply(&db);
        info!(
            path = %path.display(),
            cost_types = summary.cost_types,
            employees = summary.employees,
            expenses = summary.expenses,
            "Seed data loaded"
        );
    }

    // Blob storage for attachments and export artifacts
    let storage_config = StorageConfig::new(config.storage.clone());
    let max_upload_bytes = usize::try_from(storage_config.max_file_size)?;
    let blobs = Arc::new(StorageService::from_config(storage_config.clone())?);

    let catalog = CostTypeCatalog::new(db.cost_types.clone());
    let machine = ExpenseStateMachine::new(BusinessRuleEngine::new(config.rules.clone()));
    let expenses = ExpenseService::new(
        machine,
        db.expenses.clone(),
        catalog.clone(),
        db.employees.clone(),
        Arc::new(BlobAttachmentStore::new(blobs.clone(), storage_config)),
        db.journal.clone(),
        Arc::new(LogNotifier),
    );
    let exports = ExportPipeline::new(
        db.expenses.clone(),
        catalog,
        blobs,
        db.journal.clone(),
        config.organization.clone(),
    );

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)?,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create application state
    let state = AppState {
        expenses,
        exports,
        jwt_service: Arc::new(jwt_service),
        max_upload_bytes,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        company = %config.organization.company_name,
        "Server listening on {}",
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
