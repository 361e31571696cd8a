//! In-memory collaborators for tests

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CaseSources, DbError, VersionRepository};
use crate::model::{
    AnalysisVersion, AnalysisVersionSummary, BundleChunk, CaseDocument, CaseNote, DraftLetter,
    TimelineEvent,
};

/// Version store keeping the `(case_id, version_number)` uniqueness of the table
#[derive(Default)]
pub struct InMemoryVersionRepository {
    versions: Mutex<HashMap<String, BTreeMap<i32, AnalysisVersion>>>,
    unavailable: bool,
}

impl InMemoryVersionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose readiness check always fails
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn count(&self, case_id: &str) -> usize {
        self.versions
            .lock()
            .unwrap()
            .get(case_id)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn latest_version(&self, case_id: &str) -> Result<Option<AnalysisVersion>, DbError> {
        let versions = self.versions.lock().unwrap();
        Ok(versions
            .get(case_id)
            .and_then(|v| v.values().next_back())
            .cloned())
    }

    async fn insert_version(&self, version: &AnalysisVersion) -> Result<(), DbError> {
        let mut versions = self.versions.lock().unwrap();
        let case = versions.entry(version.case_id.clone()).or_default();
        if case.contains_key(&version.version_number) {
            return Err(DbError::VersionConflict {
                case_id: version.case_id.clone(),
                version_number: version.version_number,
            });
        }
        case.insert(version.version_number, version.clone());
        Ok(())
    }

    async fn get_version(&self, case_id: &str, version_number: i32) -> Result<AnalysisVersion, DbError> {
        let versions = self.versions.lock().unwrap();
        versions
            .get(case_id)
            .and_then(|v| v.get(&version_number))
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("{} v{}", case_id, version_number)))
    }

    async fn check_ready(&self) -> Result<(), DbError> {
        if self.unavailable {
            return Err(DbError::Serialization("version store offline".to_string()));
        }
        Ok(())
    }

    async fn list_versions(&self, case_id: &str) -> Result<Vec<AnalysisVersionSummary>, DbError> {
        let versions = self.versions.lock().unwrap();
        Ok(versions
            .get(case_id)
            .map(|v| {
                v.values()
                    .rev()
                    .map(|version| AnalysisVersionSummary {
                        case_id: version.case_id.clone(),
                        version_number: version.version_number,
                        momentum: version.momentum(),
                        document_count: version.document_ids.len(),
                        created_at: version.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Source kinds a fixture can be told to fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureSource {
    Documents,
    BundleChunks,
    TimelineEvents,
    Notes,
    Letters,
}

/// Fixed source records for a single case
#[derive(Default)]
pub struct FixtureSources {
    pub documents: Mutex<Vec<CaseDocument>>,
    pub bundle_chunks: Vec<BundleChunk>,
    pub timeline_events: Vec<TimelineEvent>,
    pub notes: Vec<CaseNote>,
    pub letters: Vec<DraftLetter>,
    pub failing: HashSet<FixtureSource>,
}

impl FixtureSources {
    pub fn with_documents(documents: Vec<CaseDocument>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn add_document(&self, document: CaseDocument) {
        self.documents.lock().unwrap().push(document);
    }

    fn check(&self, source: FixtureSource) -> Result<(), DbError> {
        if self.failing.contains(&source) {
            return Err(DbError::NotFound(format!("{:?} unavailable", source)));
        }
        Ok(())
    }
}

#[async_trait]
impl CaseSources for FixtureSources {
    async fn list_documents(&self, _case_id: &str) -> Result<Vec<CaseDocument>, DbError> {
        self.check(FixtureSource::Documents)?;
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn list_bundle_chunks(&self, _case_id: &str) -> Result<Vec<BundleChunk>, DbError> {
        self.check(FixtureSource::BundleChunks)?;
        Ok(self.bundle_chunks.clone())
    }

    async fn list_timeline_events(&self, _case_id: &str) -> Result<Vec<TimelineEvent>, DbError> {
        self.check(FixtureSource::TimelineEvents)?;
        Ok(self.timeline_events.clone())
    }

    async fn list_case_notes(&self, _case_id: &str) -> Result<Vec<CaseNote>, DbError> {
        self.check(FixtureSource::Notes)?;
        Ok(self.notes.clone())
    }

    async fn list_letters(&self, _case_id: &str) -> Result<Vec<DraftLetter>, DbError> {
        self.check(FixtureSource::Letters)?;
        Ok(self.letters.clone())
    }
}
