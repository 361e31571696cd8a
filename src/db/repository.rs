//! PostgreSQL repositories for case sources and analysis versions

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{
    AnalysisVersionRow, AnalysisVersionSummaryRow, BundleChunkRow, CaseDocumentRow, CaseLetterRow,
    CaseNoteRow, TimelineEventRow,
};
use super::{CaseSources, DbError, VersionRepository};
use crate::model::{
    AnalysisVersion, AnalysisVersionSummary, BundleChunk, CaseDocument, CaseNote, DraftLetter,
    TimelineEvent,
};

/// Read-only repository over the case source tables
#[derive(Clone)]
pub struct PgCaseSourceRepository {
    pool: PgPool,
}

impl PgCaseSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseSources for PgCaseSourceRepository {
    async fn list_documents(&self, case_id: &str) -> Result<Vec<CaseDocument>, DbError> {
        let rows: Vec<CaseDocumentRow> = sqlx::query_as(
            r#"
            SELECT id, name, doc_type, extracted_facts, ai_summary, created_at
            FROM case_documents WHERE case_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CaseDocument::from).collect())
    }

    async fn list_bundle_chunks(&self, case_id: &str) -> Result<Vec<BundleChunk>, DbError> {
        let rows: Vec<BundleChunkRow> = sqlx::query_as(
            r#"
            SELECT raw_text, ai_summary FROM bundle_chunks
            WHERE case_id = $1 ORDER BY chunk_index, id
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BundleChunk::from).collect())
    }

    async fn list_timeline_events(&self, case_id: &str) -> Result<Vec<TimelineEvent>, DbError> {
        let rows: Vec<TimelineEventRow> = sqlx::query_as(
            r#"
            SELECT event_date, description FROM timeline_events
            WHERE case_id = $1 ORDER BY event_date, id
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TimelineEvent::from).collect())
    }

    async fn list_case_notes(&self, case_id: &str) -> Result<Vec<CaseNote>, DbError> {
        let rows: Vec<CaseNoteRow> = sqlx::query_as(
            r#"
            SELECT id, body, created_at FROM case_notes
            WHERE case_id = $1 ORDER BY created_at, id
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CaseNote::from).collect())
    }

    async fn list_letters(&self, case_id: &str) -> Result<Vec<DraftLetter>, DbError> {
        let rows: Vec<CaseLetterRow> = sqlx::query_as(
            r#"
            SELECT id, template, subject, recipient, body, created_at FROM case_letters
            WHERE case_id = $1 ORDER BY created_at, id
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DraftLetter::from).collect())
    }
}

/// Repository for the append-only `analysis_versions` table
#[derive(Clone)]
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn latest_version(&self, case_id: &str) -> Result<Option<AnalysisVersion>, DbError> {
        let row: Option<AnalysisVersionRow> = sqlx::query_as(
            r#"
            SELECT * FROM analysis_versions
            WHERE case_id = $1
            ORDER BY version_number DESC
            LIMIT 1
            "#,
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_domain().map_err(DbError::Serialization))
            .transpose()
    }

    async fn insert_version(&self, version: &AnalysisVersion) -> Result<(), DbError> {
        let row = AnalysisVersionRow::from_domain(version).map_err(DbError::Serialization)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO analysis_versions (
                case_id, version_number, momentum, document_ids,
                document_set_hash, result, analysis_delta, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&row.case_id)
        .bind(row.version_number)
        .bind(&row.momentum)
        .bind(&row.document_ids)
        .bind(&row.document_set_hash)
        .bind(&row.result)
        .bind(&row.analysis_delta)
        .bind(row.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                tracing::debug!(
                    case_id = %row.case_id,
                    version = row.version_number,
                    "Inserted analysis version"
                );
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::VersionConflict {
                case_id: row.case_id,
                version_number: row.version_number,
            }),
            Err(e) => Err(DbError::Connection(e)),
        }
    }

    async fn get_version(&self, case_id: &str, version_number: i32) -> Result<AnalysisVersion, DbError> {
        let row: AnalysisVersionRow = sqlx::query_as(
            r#"
            SELECT * FROM analysis_versions WHERE case_id = $1 AND version_number = $2
            "#,
        )
        .bind(case_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("{} v{}", case_id, version_number)))?;

        row.into_domain().map_err(DbError::Serialization)
    }

    async fn check_ready(&self) -> Result<(), DbError> {
        let _: Option<(i32,)> = sqlx::query_as("SELECT version_number FROM analysis_versions LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_versions(&self, case_id: &str) -> Result<Vec<AnalysisVersionSummary>, DbError> {
        let rows: Vec<AnalysisVersionSummaryRow> = sqlx::query_as(
            r#"
            SELECT case_id, version_number, momentum,
                   jsonb_array_length(document_ids) AS document_count, created_at
            FROM analysis_versions
            WHERE case_id = $1
            ORDER BY version_number DESC
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(DbError::Serialization))
            .collect()
    }
}
