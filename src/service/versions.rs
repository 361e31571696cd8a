//! Append-only analysis version store
//!
//! Version numbers are assigned optimistically: read the latest version, write
//! `latest + 1`, and start over when the unique key on `(case_id, version_number)`
//! rejects the row because a concurrent run got there first.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::{DbError, VersionRepository};
use crate::model::{AnalysisDelta, AnalysisResult, AnalysisVersion, AnalysisVersionSummary};
use crate::service::delta::compute_delta;
use crate::service::error::AnalysisError;
use crate::service::fingerprint::document_set_hash;

#[derive(Clone)]
pub struct AnalysisVersionStore {
    repository: Arc<dyn VersionRepository>,
    max_attempts: u32,
}

impl AnalysisVersionStore {
    pub fn new(repository: Arc<dyn VersionRepository>, max_attempts: u32) -> Self {
        Self {
            repository,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Append a new version for `case_id` and diff it against the previous one.
    ///
    /// The stored row is never updated afterwards.
    pub async fn create_version(
        &self,
        case_id: &str,
        document_ids: Vec<String>,
        result: AnalysisResult,
        created_at: DateTime<Utc>,
    ) -> Result<AnalysisVersion, AnalysisError> {
        let document_set_hash = document_set_hash(&document_ids);

        for attempt in 1..=self.max_attempts {
            let previous = self.repository.latest_version(case_id).await?;
            let version_number = previous.as_ref().map_or(1, |p| p.version_number + 1);

            let mut version = AnalysisVersion {
                case_id: case_id.to_string(),
                version_number,
                document_ids: document_ids.clone(),
                document_set_hash: document_set_hash.clone(),
                result: result.clone(),
                analysis_delta: AnalysisDelta::FirstAnalysis,
                created_at,
            };
            version.analysis_delta = compute_delta(previous.as_ref(), &version);

            match self.repository.insert_version(&version).await {
                Ok(()) => {
                    tracing::info!(
                        case_id = %case_id,
                        version = version_number,
                        momentum = %version.momentum(),
                        "Created analysis version"
                    );
                    return Ok(version);
                }
                Err(DbError::VersionConflict { .. }) => {
                    tracing::warn!(
                        case_id = %case_id,
                        version = version_number,
                        attempt = attempt,
                        "Version number taken by a concurrent run, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AnalysisError::VersionConflictExhausted {
            case_id: case_id.to_string(),
            attempts: self.max_attempts,
        })
    }

    pub async fn latest(&self, case_id: &str) -> Result<Option<AnalysisVersion>, AnalysisError> {
        Ok(self.repository.latest_version(case_id).await?)
    }

    pub async fn get(&self, case_id: &str, version_number: i32) -> Result<AnalysisVersion, AnalysisError> {
        Ok(self.repository.get_version(case_id, version_number).await?)
    }

    pub async fn list(&self, case_id: &str) -> Result<Vec<AnalysisVersionSummary>, AnalysisError> {
        Ok(self.repository.list_versions(case_id).await?)
    }

    pub async fn check_ready(&self) -> Result<(), AnalysisError> {
        Ok(self.repository.check_ready().await?)
    }
}
