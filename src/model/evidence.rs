use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// An independently scored axis of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Breach,
    Causation,
    Harm,
    ExpertPresence,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Breach => "breach",
            Dimension::Causation => "causation",
            Dimension::Harm => "harm",
            Dimension::ExpertPresence => "expert_presence",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Banded level for a dimension score.
///
/// `Present` replaces `High` as the top band of the harm dimension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionLevel {
    None,
    Low,
    Medium,
    High,
    Present,
}

// One matched pattern inside a scoring pass. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EvidenceFlag {
    pub id: String,
    pub label: String,
    pub severity: Severity,
    pub reasoning: String,
    pub dimension: Dimension,
}

/// Outcome of scoring one dimension against a case corpus
///
/// - score: sum of matched weights, capped at 100
/// - detected: true exactly when at least one flag was raised
/// - indicators: labels of everything that matched, in pattern order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub score: u32,
    pub level: DimensionLevel,
    pub detected: bool,
    pub flags: Vec<EvidenceFlag>,
    pub indicators: Vec<String>,
}

impl DimensionResult {
    /// The "insufficient evidence" result: nothing detected, level NONE
    pub fn not_detected(dimension: Dimension) -> Self {
        Self {
            dimension,
            score: 0,
            level: DimensionLevel::None,
            detected: false,
            flags: Vec::new(),
            indicators: Vec::new(),
        }
    }
}
