use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::correspondence::OpponentActivity;
use super::evidence::DimensionResult;
use super::strength::EvidenceStrengthResult;

/// The engine's single ordered judgment of case strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseMomentum {
    Weak,
    Balanced,
    Strong,
    StrongExpertPending,
}

impl CaseMomentum {
    /// Position in the ordering WEAK < BALANCED < STRONG_EXPERT_PENDING < STRONG
    pub fn rank(&self) -> u8 {
        match self {
            CaseMomentum::Weak => 0,
            CaseMomentum::Balanced => 1,
            CaseMomentum::StrongExpertPending => 2,
            CaseMomentum::Strong => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseMomentum::Weak => "WEAK",
            CaseMomentum::Balanced => "BALANCED",
            CaseMomentum::Strong => "STRONG",
            CaseMomentum::StrongExpertPending => "STRONG_EXPERT_PENDING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WEAK" => Some(CaseMomentum::Weak),
            "BALANCED" => Some(CaseMomentum::Balanced),
            "STRONG" => Some(CaseMomentum::Strong),
            "STRONG_EXPERT_PENDING" => Some(CaseMomentum::StrongExpertPending),
            _ => None,
        }
    }
}

impl fmt::Display for CaseMomentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StrategicOption {
    LetterOfClaim,
    SettlementOffer,
    IssueProceedings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MomentumAssessment {
    pub state: CaseMomentum,
    pub breach_detected: bool,
    pub causation_detected: bool,
    pub harm_detected: bool,
    pub expert_present: bool,
    pub rationale: String,
    pub locked_options: Vec<StrategicOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyIssue {
    /// Stable across runs: the upstream id, or a slug of the label
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct MissingEvidence {
    pub area: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimelineEntry {
    pub date: DateTime<Utc>,
    pub description: String,
}

/// Everything one analysis run computes, before it is numbered and stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub momentum: MomentumAssessment,
    pub breach: DimensionResult,
    pub causation: DimensionResult,
    pub harm: DimensionResult,
    pub expert_presence: DimensionResult,
    pub evidence_strength: EvidenceStrengthResult,
    pub opponent_activity: Option<OpponentActivity>,
    pub summary: String,
    pub key_issues: Vec<KeyIssue>,
    pub timeline: Vec<TimelineEntry>,
    pub missing_evidence: Vec<MissingEvidence>,
}

/// An immutable, numbered snapshot of one analysis run
///
/// - version_number: 1-based, strictly increasing per case
/// - document_ids: the exact evidence set the run used
/// - analysis_delta: the change against the version immediately before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisVersion {
    pub case_id: String,
    pub version_number: i32,
    pub document_ids: Vec<String>,
    pub document_set_hash: String,
    pub result: AnalysisResult,
    pub analysis_delta: AnalysisDelta,
    pub created_at: DateTime<Utc>,
}

impl AnalysisVersion {
    pub fn momentum(&self) -> CaseMomentum {
        self.result.momentum.state
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisVersionSummary {
    pub case_id: String,
    pub version_number: i32,
    pub momentum: CaseMomentum,
    pub document_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Unchanged,
    Improved,
    Declined,
    /// STRONG_EXPERT_PENDING → STRONG: an expert report has been detected
    ExpertConfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MomentumTransition {
    pub from: CaseMomentum,
    pub to: CaseMomentum,
    pub kind: TransitionKind,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeltaReport {
    pub from_version: i32,
    pub to_version: i32,
    pub momentum: MomentumTransition,
    pub key_issues_added: Vec<KeyIssue>,
    pub key_issues_removed: Vec<KeyIssue>,
    pub missing_evidence_added: Vec<MissingEvidence>,
    pub missing_evidence_resolved: Vec<MissingEvidence>,
    pub documents_added: Vec<String>,
    pub documents_removed: Vec<String>,
}

impl DeltaReport {
    pub fn is_empty(&self) -> bool {
        self.momentum.kind == TransitionKind::Unchanged
            && self.key_issues_added.is_empty()
            && self.key_issues_removed.is_empty()
            && self.missing_evidence_added.is_empty()
            && self.missing_evidence_resolved.is_empty()
            && self.documents_added.is_empty()
            && self.documents_removed.is_empty()
    }
}

/// Change between a version and the one before it.
///
/// `FirstAnalysis` means there was nothing to compare against, which is not
/// the same thing as `Unchanged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum AnalysisDelta {
    FirstAnalysis,
    Unchanged(DeltaReport),
    Changed(DeltaReport),
}

impl AnalysisDelta {
    pub fn report(&self) -> Option<&DeltaReport> {
        match self {
            AnalysisDelta::FirstAnalysis => None,
            AnalysisDelta::Unchanged(report) | AnalysisDelta::Changed(report) => Some(report),
        }
    }
}
