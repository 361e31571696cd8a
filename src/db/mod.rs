//! Database module for PostgreSQL persistence

#[cfg(test)]
pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

use crate::model::{
    AnalysisVersion, AnalysisVersionSummary, BundleChunk, CaseDocument, CaseNote, DraftLetter,
    TimelineEvent,
};

// Environment variable names
const ENV_POSTGRES_HOST: &str = "CASE_MOMENTUM_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "CASE_MOMENTUM_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "CASE_MOMENTUM_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "CASE_MOMENTUM_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "CASE_MOMENTUM_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "case_momentum";
const DEFAULT_POSTGRES_PASSWORD: &str = "case_momentum";
const DEFAULT_POSTGRES_DB: &str = "case_momentum";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Version {version_number} of case {case_id} already exists")]
    VersionConflict { case_id: String, version_number: i32 },
}

/// Read-only access to everything an analysis run reads for one case
#[async_trait]
pub trait CaseSources: Send + Sync {
    async fn list_documents(&self, case_id: &str) -> Result<Vec<CaseDocument>, DbError>;

    async fn list_bundle_chunks(&self, case_id: &str) -> Result<Vec<BundleChunk>, DbError>;

    async fn list_timeline_events(&self, case_id: &str) -> Result<Vec<TimelineEvent>, DbError>;

    async fn list_case_notes(&self, case_id: &str) -> Result<Vec<CaseNote>, DbError>;

    async fn list_letters(&self, case_id: &str) -> Result<Vec<DraftLetter>, DbError>;
}

/// Append-only storage of analysis versions.
///
/// Implementations must reject a second row with the same
/// `(case_id, version_number)` with [`DbError::VersionConflict`].
#[async_trait]
pub trait VersionRepository: Send + Sync {
    async fn latest_version(&self, case_id: &str) -> Result<Option<AnalysisVersion>, DbError>;

    async fn insert_version(&self, version: &AnalysisVersion) -> Result<(), DbError>;

    async fn get_version(&self, case_id: &str, version_number: i32) -> Result<AnalysisVersion, DbError>;

    /// Summaries, newest first
    async fn list_versions(&self, case_id: &str) -> Result<Vec<AnalysisVersionSummary>, DbError>;

    /// Fails unless the backing store can serve version reads
    async fn check_ready(&self) -> Result<(), DbError>;
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );

    tracing::debug!(host = %host, port = %port, database = %database, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS case_documents (
        id VARCHAR(64) PRIMARY KEY,
        case_id VARCHAR(64) NOT NULL,
        name TEXT NOT NULL,
        doc_type VARCHAR(100),
        extracted_facts JSONB,
        ai_summary TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bundle_chunks (
        id BIGSERIAL PRIMARY KEY,
        case_id VARCHAR(64) NOT NULL,
        chunk_index INTEGER NOT NULL DEFAULT 0,
        raw_text TEXT,
        ai_summary TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS timeline_events (
        id BIGSERIAL PRIMARY KEY,
        case_id VARCHAR(64) NOT NULL,
        event_date TIMESTAMPTZ NOT NULL,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS case_notes (
        id VARCHAR(64) PRIMARY KEY,
        case_id VARCHAR(64) NOT NULL,
        body TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS case_letters (
        id VARCHAR(64) PRIMARY KEY,
        case_id VARCHAR(64) NOT NULL,
        template VARCHAR(100),
        subject TEXT,
        recipient TEXT,
        body TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS analysis_versions (
        case_id VARCHAR(64) NOT NULL,
        version_number INTEGER NOT NULL,
        momentum VARCHAR(32) NOT NULL,
        document_ids JSONB NOT NULL DEFAULT '[]',
        document_set_hash VARCHAR(64) NOT NULL,
        result JSONB NOT NULL,
        analysis_delta JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT analysis_versions_case_version_key UNIQUE (case_id, version_number)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_case_documents_case_id ON case_documents(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_bundle_chunks_case_id ON bundle_chunks(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_events_case_id ON timeline_events(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_case_notes_case_id ON case_notes(case_id)",
    "CREATE INDEX IF NOT EXISTS idx_case_letters_case_id ON case_letters(case_id)",
];

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema initialized");

    Ok(())
}
