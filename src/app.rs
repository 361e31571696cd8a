//! Application state and service initialization

use std::sync::Arc;

use crate::db::repository::{PgCaseSourceRepository, PgVersionRepository};
use crate::model::Config;
use crate::service::{AnalysisCache, AnalysisService};

/// Shared resources handed to the HTTP workers
pub struct AppState {
    /// Case analysis service; owns the pool-backed repositories and the optional cache
    pub analysis_service: AnalysisService,
}

impl AppState {
    /// Connect to the database, create the schema and wire the analysis service.
    ///
    /// Redis is optional: when it cannot be reached the service runs uncached.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        if config.analysis.version_conflict_retries == 0 {
            return Err(AppError::InvalidConfig(
                "analysis.version_conflict_retries must be at least 1",
            ));
        }

        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let cache = match AnalysisCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        let analysis_service = AnalysisService::new(
            Arc::new(PgCaseSourceRepository::new(db_pool.clone())),
            Arc::new(PgVersionRepository::new(db_pool)),
            cache,
            config.analysis,
        );

        Ok(Self { analysis_service })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
