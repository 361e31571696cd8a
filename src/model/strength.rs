use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthLevel {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LanguageTone {
    Aggressive,
    Moderate,
    Conservative,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IdentificationFactor {
    pub strength: u32,
    pub has_cctv: bool,
    pub has_witness_identification: bool,
    pub has_facial_recognition: bool,
    pub has_formal_procedure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForensicsFactor {
    pub strength: u32,
    pub has_dna: bool,
    pub has_fingerprints: bool,
    pub has_forensic_report: bool,
    pub has_digital_evidence: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WitnessFactor {
    pub strength: u32,
    pub has_independent_witness: bool,
    pub has_multiple_witnesses: bool,
    pub has_consistent_accounts: bool,
    pub has_official_witness: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProceduralFactor {
    pub strength: u32,
    pub has_statutory_compliance: bool,
    pub has_caution: bool,
    pub has_recorded_interview: bool,
    pub has_legal_representation: bool,
    /// Set when strength reaches the high-compliance threshold
    pub high_compliance: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicalFactor {
    pub strength: u32,
    pub has_medical_records: bool,
    pub has_documented_injuries: bool,
    pub has_medical_expert: bool,
    pub has_injury_photographs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DisclosureFactor {
    pub strength: u32,
    pub has_disclosure: bool,
    pub has_unused_schedule: bool,
    pub disclosure_complete: bool,
    pub critical_gap: bool,
}

/// Threshold-driven framing directives derived from the factor scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Calibration {
    pub should_downgrade_aggressive_framing: bool,
    pub should_downgrade_procedural_challenge: bool,
    pub should_downgrade_identification_challenge: bool,
    pub realistic_outcome: String,
    pub language_tone: LanguageTone,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EvidenceStrengthResult {
    pub identification: IdentificationFactor,
    pub forensics: ForensicsFactor,
    pub witnesses: WitnessFactor,
    pub procedural_compliance: ProceduralFactor,
    pub medical: MedicalFactor,
    pub disclosure: DisclosureFactor,
    pub overall_strength: u32,
    pub level: StrengthLevel,
    pub calibration: Calibration,
    pub insufficient_evidence: bool,
}
