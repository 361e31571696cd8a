//! Evidence-strength calibration
//!
//! Scores how strong the evidence against the client's position is, and turns
//! that into framing directives so generated narratives do not overstate a case
//! the other side can objectively answer.

pub mod factors;

use crate::model::{
    Calibration, DisclosureFactor, EvidenceStrengthResult, ForensicsFactor, IdentificationFactor,
    LanguageTone, MedicalFactor, OpponentActivity, OpponentActivityStatus, ProceduralFactor,
    StrengthLevel, WitnessFactor,
};
use crate::service::scoring::ScoringThresholds;

const WEIGHT_IDENTIFICATION: f64 = 0.25;
const WEIGHT_FORENSICS: f64 = 0.25;
const WEIGHT_WITNESSES: f64 = 0.20;
const WEIGHT_PROCEDURAL: f64 = 0.10;
const WEIGHT_MEDICAL: f64 = 0.10;
const WEIGHT_DISCLOSURE: f64 = 0.10;

/// Overall strength from which downgrade directives may fire
const DOWNGRADE_FROM: u32 = 60;
/// Sub-factor strength that makes a specific challenge unrealistic
const FACTOR_STRONG: u32 = 60;
/// Overall strength from which a tone warning is always emitted
const WARN_FROM: u32 = 70;

fn level_for(strength: u32) -> StrengthLevel {
    if strength >= 80 {
        StrengthLevel::VeryStrong
    } else if strength >= 60 {
        StrengthLevel::Strong
    } else if strength >= 40 {
        StrengthLevel::Moderate
    } else if strength >= 20 {
        StrengthLevel::Weak
    } else {
        StrengthLevel::VeryWeak
    }
}

fn tone_for(strength: u32) -> LanguageTone {
    if strength >= 70 {
        LanguageTone::Conservative
    } else if strength >= 40 {
        LanguageTone::Moderate
    } else {
        LanguageTone::Aggressive
    }
}

fn realistic_outcome(level: StrengthLevel) -> &'static str {
    match level {
        StrengthLevel::VeryStrong => {
            "The opposing evidence is very strong; focus on mitigation and negotiated outcomes"
        }
        StrengthLevel::Strong => {
            "The opposing evidence is strong; contest selectively and prepare a fallback position"
        }
        StrengthLevel::Moderate => {
            "The evidence is balanced; targeted challenges to the weaker factors are realistic"
        }
        StrengthLevel::Weak => "The opposing evidence has clear weaknesses that can be challenged",
        StrengthLevel::VeryWeak => "The opposing evidence is thin; a robust challenge is realistic",
    }
}

/// Weighted dot product of the six factor strengths, rounded to a whole score
fn overall_strength(
    identification: &IdentificationFactor,
    forensics: &ForensicsFactor,
    witnesses: &WitnessFactor,
    procedural: &ProceduralFactor,
    medical: &MedicalFactor,
    disclosure: &DisclosureFactor,
) -> u32 {
    let weighted = identification.strength as f64 * WEIGHT_IDENTIFICATION
        + forensics.strength as f64 * WEIGHT_FORENSICS
        + witnesses.strength as f64 * WEIGHT_WITNESSES
        + procedural.strength as f64 * WEIGHT_PROCEDURAL
        + medical.strength as f64 * WEIGHT_MEDICAL
        + disclosure.strength as f64 * WEIGHT_DISCLOSURE;
    weighted.round().clamp(0.0, 100.0) as u32
}

/// Score the six factors over the corpus and derive the calibration.
///
/// `opponent` is the responsiveness signal from the correspondence timeline,
/// when one has been built.
pub fn calibrate(
    corpus: &str,
    opponent: Option<&OpponentActivity>,
    thresholds: &ScoringThresholds,
) -> EvidenceStrengthResult {
    if !thresholds.is_sufficient(corpus) {
        return insufficient(opponent);
    }

    let text = corpus.to_lowercase();
    let identification = factors::identification(&text);
    let forensics = factors::forensics(&text);
    let witnesses = factors::witnesses(&text);
    let procedural = factors::procedural(&text);
    let medical = factors::medical(&text);
    let disclosure = factors::disclosure(&text);

    let overall = overall_strength(
        &identification,
        &forensics,
        &witnesses,
        &procedural,
        &medical,
        &disclosure,
    );
    let level = level_for(overall);

    let downgrade = overall >= DOWNGRADE_FROM;
    let mut warnings = Vec::new();

    if overall >= WARN_FROM {
        warnings.push(format!(
            "Opposing evidence scores {}/100; narrative tone has been downgraded to conservative",
            overall
        ));
    }
    if procedural.high_compliance {
        warnings.push(
            "Procedural compliance is high; procedural challenges are unlikely to succeed and should not lead the case"
                .to_string(),
        );
    }
    if disclosure.critical_gap {
        warnings.push(
            "A critical disclosure gap was found; pursue the outstanding material before relying on the disclosed evidence"
                .to_string(),
        );
    }
    warnings.extend(opponent_warning(opponent));

    let calibration = Calibration {
        should_downgrade_aggressive_framing: downgrade
            && (forensics.strength >= FACTOR_STRONG || witnesses.strength >= FACTOR_STRONG),
        should_downgrade_procedural_challenge: downgrade
            && procedural.high_compliance
            && !disclosure.critical_gap,
        should_downgrade_identification_challenge: downgrade
            && identification.strength >= FACTOR_STRONG,
        realistic_outcome: realistic_outcome(level).to_string(),
        language_tone: tone_for(overall),
        warnings,
    };

    tracing::debug!(
        overall = overall,
        level = ?level,
        tone = ?calibration.language_tone,
        "Calibrated evidence strength"
    );

    EvidenceStrengthResult {
        identification,
        forensics,
        witnesses,
        procedural_compliance: procedural,
        medical,
        disclosure,
        overall_strength: overall,
        level,
        calibration,
        insufficient_evidence: false,
    }
}

fn opponent_warning(opponent: Option<&OpponentActivity>) -> Option<String> {
    let activity = opponent?;
    match activity.status {
        OpponentActivityStatus::ConcerningSilence => Some(format!(
            "The other side has not replied for {} days, well beyond their usual {:.0} days; consider chasing disclosure or applying for directions",
            activity.days_waiting.unwrap_or_default(),
            activity.average_reply_days.unwrap_or_default()
        )),
        _ => None,
    }
}

fn insufficient(opponent: Option<&OpponentActivity>) -> EvidenceStrengthResult {
    let mut warnings =
        vec!["Not enough case material to assess evidence strength; no framing directive applies".to_string()];
    warnings.extend(opponent_warning(opponent));

    EvidenceStrengthResult {
        identification: IdentificationFactor::default(),
        forensics: ForensicsFactor::default(),
        witnesses: WitnessFactor::default(),
        procedural_compliance: ProceduralFactor::default(),
        medical: MedicalFactor::default(),
        disclosure: DisclosureFactor::default(),
        overall_strength: 0,
        level: StrengthLevel::VeryWeak,
        calibration: Calibration {
            should_downgrade_aggressive_framing: false,
            should_downgrade_procedural_challenge: false,
            should_downgrade_identification_challenge: false,
            realistic_outcome: "Insufficient evidence to assess a realistic outcome".to_string(),
            language_tone: LanguageTone::Moderate,
            warnings,
        },
        insufficient_evidence: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_CASE: &str = "Prosecution bundle. CCTV footage shows the suspect leaving the premises. \
        He was picked out at a VIPER identification parade and facial recognition returned a match. \
        DNA recovered from the handle matches his profile and a fingerprint was lifted from the door. \
        A forensic report and a phone download have been served. An independent witness and two other \
        witnesses gave consistent accounts. The interview was recorded under caution with a duty solicitor \
        present, in accordance with PACE. Disclosure complete; schedule of unused material served.";

    #[test]
    fn test_strong_case_is_conservative() {
        let result = calibrate(STRONG_CASE, None, &ScoringThresholds::default());

        assert!(!result.insufficient_evidence);
        assert!(result.overall_strength >= 80, "overall {}", result.overall_strength);
        assert_eq!(result.level, StrengthLevel::VeryStrong);
        assert_eq!(result.calibration.language_tone, LanguageTone::Conservative);
        assert!(result.calibration.should_downgrade_aggressive_framing);
        assert!(result.calibration.should_downgrade_identification_challenge);
        assert!(result.calibration.should_downgrade_procedural_challenge);
        assert!(result.calibration.warnings.iter().any(|w| w.contains("conservative")));
        assert!(result.calibration.warnings.iter().any(|w| w.contains("Procedural compliance")));
    }

    #[test]
    fn test_disclosure_gap_blocks_procedural_downgrade() {
        let corpus = format!("{} However the custody record has not been disclosed.", STRONG_CASE);
        let result = calibrate(&corpus, None, &ScoringThresholds::default());

        assert!(result.disclosure.critical_gap);
        assert!(result.procedural_compliance.high_compliance);
        assert!(!result.calibration.should_downgrade_procedural_challenge);
    }

    #[test]
    fn test_weak_case_stays_aggressive() {
        let corpus = "Client account: I was stopped in the street and arrested. Nobody else was there at the time \
            and there is nothing recovered from me. The officer did not explain why I was arrested.";
        let result = calibrate(corpus, None, &ScoringThresholds::default());

        assert!(result.overall_strength < 40);
        assert_eq!(result.calibration.language_tone, LanguageTone::Aggressive);
        assert!(!result.calibration.should_downgrade_aggressive_framing);
        assert!(result.calibration.warnings.is_empty());
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_IDENTIFICATION
            + WEIGHT_FORENSICS
            + WEIGHT_WITNESSES
            + WEIGHT_PROCEDURAL
            + WEIGHT_MEDICAL
            + WEIGHT_DISCLOSURE;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_corpus_is_insufficient() {
        let result = calibrate("cctv dna", None, &ScoringThresholds::default());

        assert!(result.insufficient_evidence);
        assert_eq!(result.overall_strength, 0);
        assert!(!result.calibration.should_downgrade_aggressive_framing);
    }

    #[test]
    fn test_concerning_silence_adds_warning() {
        let activity = OpponentActivity {
            status: OpponentActivityStatus::ConcerningSilence,
            days_waiting: Some(40),
            average_reply_days: Some(12.0),
        };
        let result = calibrate(STRONG_CASE, Some(&activity), &ScoringThresholds::default());

        assert!(result.calibration.warnings.iter().any(|w| w.contains("40 days")));
    }

    #[test]
    fn test_tone_and_level_bands() {
        assert_eq!(tone_for(70), LanguageTone::Conservative);
        assert_eq!(tone_for(69), LanguageTone::Moderate);
        assert_eq!(tone_for(40), LanguageTone::Moderate);
        assert_eq!(tone_for(39), LanguageTone::Aggressive);
        assert_eq!(level_for(80), StrengthLevel::VeryStrong);
        assert_eq!(level_for(60), StrengthLevel::Strong);
        assert_eq!(level_for(40), StrengthLevel::Moderate);
        assert_eq!(level_for(20), StrengthLevel::Weak);
        assert_eq!(level_for(19), StrengthLevel::VeryWeak);
    }
}
