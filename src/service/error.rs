//! Error types for analysis runs

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("Version store error: {0}")]
    Store(#[from] DbError),

    #[error("Could not assign a version number for case {case_id} after {attempts} attempts")]
    VersionConflictExhausted { case_id: String, attempts: u32 },
}
