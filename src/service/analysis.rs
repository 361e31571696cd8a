//! Analysis orchestration
//!
//! One run reads the case sources, scores every dimension, derives momentum and
//! evidence strength, and appends the result as a new version.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::{CaseSources, DbError, VersionRepository};
use crate::model::{
    AnalysisResult, AnalysisSettings, AnalysisVersion, AnalysisVersionSummary,
    CorrespondenceTimeline, DependencyState, Dimension, DimensionResult, EvidenceStrengthResult,
    MissingEvidence, MomentumAssessment, Readiness,
};
use crate::service::cache::AnalysisCache;
use crate::service::correspondence::{TimelineSettings, build_timeline};
use crate::service::corpus::{CaseCorpus, CaseRecords, assemble, load_records};
use crate::service::error::AnalysisError;
use crate::service::momentum::{MomentumInputs, assess};
use crate::service::scoring::patterns::{BREACH_PATTERNS, CAUSATION_PATTERNS, HARM_PATTERNS};
use crate::service::scoring::{ScoringThresholds, detect_expert_presence, score};
use crate::service::strength::calibrate;
use crate::service::versions::AnalysisVersionStore;

fn missing(area: &str, label: &str) -> MissingEvidence {
    MissingEvidence {
        area: area.to_string(),
        label: label.to_string(),
    }
}

fn dimension_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Breach => "Evidence of breach of duty",
        Dimension::Causation => "Evidence of causation",
        Dimension::Harm => "Evidence of harm",
        Dimension::ExpertPresence => "Independent expert report",
    }
}

/// Evidence a run could not find, in a fixed order
pub fn missing_evidence(
    sufficient: bool,
    dimensions: [&DimensionResult; 3],
    expert: &DimensionResult,
    strength: &EvidenceStrengthResult,
) -> Vec<MissingEvidence> {
    let mut items = Vec::new();

    if !sufficient {
        items.push(missing("corpus", "Case documents"));
    }
    for result in dimensions.into_iter().filter(|r| !r.detected) {
        items.push(missing(result.dimension.as_str(), dimension_label(result.dimension)));
    }
    if !expert.detected {
        items.push(missing("expert", dimension_label(Dimension::ExpertPresence)));
    }
    if strength.disclosure.critical_gap {
        items.push(missing("disclosure", "Outstanding disclosure"));
    }

    items
}

fn summarize(
    momentum: &MomentumAssessment,
    strength: &EvidenceStrengthResult,
    corpus: &CaseCorpus,
) -> String {
    let strength_line = if strength.insufficient_evidence {
        "Evidence strength could not be assessed.".to_string()
    } else {
        format!(
            "Opposing evidence strength {}/100; recommended tone {:?}.",
            strength.overall_strength, strength.calibration.language_tone
        )
    };

    format!(
        "Momentum {} across {} document(s). {}. {}",
        momentum.state,
        corpus.document_ids.len(),
        momentum.rationale,
        strength_line
    )
}

/// Score one case from its loaded records. Pure apart from logging.
pub fn evaluate(
    records: &CaseRecords,
    settings: &AnalysisSettings,
    now: DateTime<Utc>,
) -> (CaseCorpus, AnalysisResult) {
    let corpus = assemble(records, settings);
    let thresholds = ScoringThresholds::from_settings(settings);

    let breach = score(&corpus.text, &BREACH_PATTERNS, &thresholds);
    let causation = score(&corpus.text, &CAUSATION_PATTERNS, &thresholds);
    let harm = score(&corpus.text, &HARM_PATTERNS, &thresholds);
    let expert_presence = detect_expert_presence(&corpus.text, &corpus.document_names, &thresholds);

    let momentum = assess(MomentumInputs::from_results(
        &breach,
        &causation,
        &harm,
        &expert_presence,
    ));

    let timeline = correspondence_of(records, settings, now);
    let opponent_activity = (!timeline.items.is_empty()).then(|| timeline.opponent_activity.clone());

    let evidence_strength = calibrate(&corpus.text, opponent_activity.as_ref(), &thresholds);
    let missing_evidence = missing_evidence(
        thresholds.is_sufficient(&corpus.text),
        [&breach, &causation, &harm],
        &expert_presence,
        &evidence_strength,
    );
    let summary = summarize(&momentum, &evidence_strength, &corpus);

    let result = AnalysisResult {
        momentum,
        breach,
        causation,
        harm,
        expert_presence,
        evidence_strength,
        opponent_activity,
        summary,
        key_issues: corpus.key_issues.clone(),
        timeline: corpus.timeline.clone(),
        missing_evidence,
    };

    (corpus, result)
}

fn correspondence_of(
    records: &CaseRecords,
    settings: &AnalysisSettings,
    now: DateTime<Utc>,
) -> CorrespondenceTimeline {
    build_timeline(
        &records.notes,
        &records.documents,
        &records.letters,
        now,
        &TimelineSettings::from_settings(settings),
    )
}

/// Service running and serving case analyses
pub struct AnalysisService {
    sources: Arc<dyn CaseSources>,
    store: AnalysisVersionStore,
    cache: Option<AnalysisCache>,
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(
        sources: Arc<dyn CaseSources>,
        versions: Arc<dyn VersionRepository>,
        cache: Option<AnalysisCache>,
        settings: AnalysisSettings,
    ) -> Self {
        let store = AnalysisVersionStore::new(versions, settings.version_conflict_retries);
        Self {
            sources,
            store,
            cache,
            settings,
        }
    }

    /// Run a full analysis of `case_id` and store it as a new version
    pub async fn analyze_case(
        &self,
        case_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AnalysisVersion, AnalysisError> {
        let records = load_records(self.sources.as_ref(), case_id).await;
        let (corpus, result) = evaluate(&records, &self.settings, now);

        tracing::debug!(
            case_id = %case_id,
            chars = corpus.text.chars().count(),
            failed_sources = ?corpus.failed_sources,
            momentum = %result.momentum.state,
            "Evaluated case"
        );

        let version = self
            .store
            .create_version(case_id, corpus.document_ids, result, now)
            .await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_latest(&version).await {
                tracing::warn!(case_id = %case_id, error = %e, "Failed to cache latest analysis");
            }
        }

        Ok(version)
    }

    /// Latest version of a case, from the cache when possible
    pub async fn latest(&self, case_id: &str) -> Result<AnalysisVersion, AnalysisError> {
        if let Some(cache) = &self.cache {
            match cache.get_latest(case_id).await {
                Ok(version) => {
                    tracing::debug!(case_id = %case_id, "Cache hit for latest analysis");
                    return Ok(version);
                }
                Err(e) => tracing::debug!(case_id = %case_id, error = %e, "Latest analysis not cached"),
            }
        }

        let version = self
            .store
            .latest(case_id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("No analysis for case {}", case_id)))?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_latest(&version).await {
                tracing::warn!(case_id = %case_id, error = %e, "Failed to cache latest analysis");
            }
        }

        Ok(version)
    }

    pub async fn get_version(
        &self,
        case_id: &str,
        version_number: i32,
    ) -> Result<AnalysisVersion, AnalysisError> {
        self.store.get(case_id, version_number).await
    }

    pub async fn list_versions(&self, case_id: &str) -> Result<Vec<AnalysisVersionSummary>, AnalysisError> {
        self.store.list(case_id).await
    }

    /// Probe the version store and, when configured, the cache
    pub async fn readiness(&self) -> Readiness {
        let version_store = match self.store.check_ready().await {
            Ok(()) => DependencyState::Up,
            Err(e) => {
                tracing::error!(error = %e, "Version store readiness check failed");
                DependencyState::Down
            }
        };

        let cache = match &self.cache {
            None => DependencyState::Disabled,
            Some(cache) => match cache.ping().await {
                Ok(()) => DependencyState::Up,
                Err(e) => {
                    tracing::warn!(error = %e, "Cache readiness check failed");
                    DependencyState::Down
                }
            },
        };

        Readiness {
            version_store,
            cache,
        }
    }

    /// Correspondence timeline of a case as of `now`
    pub async fn correspondence(&self, case_id: &str, now: DateTime<Utc>) -> CorrespondenceTimeline {
        let records = load_records(self.sources.as_ref(), case_id).await;
        correspondence_of(&records, &self.settings, now)
    }
}
