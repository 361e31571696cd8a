//! Weighted pattern tables for the breach, causation and harm dimensions
//!
//! Tables are compiled once per process. Severity cutoffs differ per dimension:
//! breach and causation flag HIGH from weight 25, harm from weight 30.

use once_cell::sync::Lazy;

use super::{Matcher, PatternSet, SeverityThresholds};
use crate::model::{Dimension, DimensionLevel};

pub const BREACH_SEVERITY: SeverityThresholds = SeverityThresholds { high: 25, medium: 20 };
pub const CAUSATION_SEVERITY: SeverityThresholds = SeverityThresholds { high: 25, medium: 20 };
pub const HARM_SEVERITY: SeverityThresholds = SeverityThresholds { high: 30, medium: 20 };

pub(super) fn re(source: &str) -> Matcher {
    Matcher::pattern(source).unwrap_or_else(|e| panic!("invalid pattern {source:?}: {e}"))
}

fn lit(text: &str) -> Matcher {
    Matcher::literal(text)
}

pub static BREACH_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    let mut set = PatternSet::new(Dimension::Breach, BREACH_SEVERITY);
    set.push(
        "no_fracture_seen",
        lit("no fracture seen"),
        25,
        "Imaging reported as normal",
        "Imaging was reported as showing no fracture; if a fracture was later confirmed this points to a misreport",
    )
    .push(
        "failed_to_refer",
        lit("failed to refer"),
        20,
        "Failure to refer",
        "Records describe a failure to refer the patient on for specialist review",
    )
    .push(
        "missed_diagnosis",
        re(r"missed\s+(?:the\s+)?diagnos(?:is|ed)"),
        25,
        "Missed diagnosis",
        "A diagnosis is described as missed",
    )
    .push(
        "delayed_diagnosis",
        re(r"delay(?:ed)?\s+(?:in\s+)?diagnos(?:is|ed)"),
        20,
        "Delayed diagnosis",
        "The diagnosis is described as delayed",
    )
    .push(
        "failed_to_escalate",
        re(r"fail(?:ed|ure)\s+to\s+escalate"),
        20,
        "Failure to escalate",
        "Deterioration was not escalated to a senior clinician",
    )
    .push(
        "breach_of_duty",
        re(r"breach(?:ed)?\s+(?:of\s+)?(?:the(?:ir)?\s+)?duty"),
        25,
        "Breach of duty stated",
        "The documents expressly describe a breach of duty",
    )
    .push(
        "protocol_not_followed",
        re(r"fail(?:ed|ure)\s+to\s+follow\s+(?:the\s+)?(?:protocol|guidance|guideline|policy)"),
        20,
        "Protocol not followed",
        "Applicable guidance or protocol was not followed",
    )
    .push(
        "discharged_without",
        re(r"discharged\s+without\s+(?:an?\s+)?(?:x-?ray|scan|imaging|review|follow-?up)"),
        15,
        "Premature discharge",
        "The patient was discharged without investigation or follow-up",
    )
    .push(
        "inadequate_monitoring",
        re(r"inadequate\s+(?:monitoring|observations?)"),
        15,
        "Inadequate monitoring",
        "Monitoring or observations are described as inadequate",
    )
    .push(
        "misinterpreted",
        re(r"\bmis-?(?:read|interpreted)\b"),
        15,
        "Results misread",
        "Results or imaging were misread or misinterpreted",
    )
    .push(
        "no_safety_net",
        re(r"no\s+safety[\s-]?net(?:ting)?\s+advice"),
        10,
        "No safety-netting advice",
        "No safety-netting advice was given on discharge",
    )
    .push(
        "no_consent",
        re(r"fail(?:ed|ure)\s+to\s+obtain\s+(?:informed\s+)?consent"),
        20,
        "Consent not obtained",
        "Informed consent was not obtained before treatment",
    );
    set
});

pub static CAUSATION_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    let mut set = PatternSet::new(Dimension::Causation, CAUSATION_SEVERITY);
    set.push(
        "but_for",
        re(r"\bbut\s+for\b"),
        25,
        "But-for causation",
        "The documents apply the but-for test to the outcome",
    )
    .push(
        "balance_of_probabilities",
        lit("on the balance of probabilities"),
        20,
        "Balance of probabilities",
        "A finding is expressed on the civil standard of proof",
    )
    .push(
        "avoidable_outcome",
        re(r"would\s+(?:probably\s+|likely\s+)?(?:have\s+)?(?:been\s+)?(?:avoided|prevented)"),
        25,
        "Outcome avoidable",
        "The outcome is described as avoidable with proper care",
    )
    .push(
        "earlier_treatment",
        re(r"earlier\s+(?:treatment|intervention|surgery|diagnosis)"),
        20,
        "Earlier treatment",
        "Earlier treatment is said to have changed the outcome",
    )
    .push(
        "result_of_delay",
        re(r"as\s+a\s+(?:direct\s+)?(?:result|consequence)\s+of\s+(?:the\s+)?delay"),
        20,
        "Consequence of delay",
        "Harm is attributed to the delay",
    )
    .push(
        "material_contribution",
        re(r"material(?:ly)?\s+contribut(?:ion|ed)"),
        20,
        "Material contribution",
        "The negligence is said to have materially contributed to the injury",
    )
    .push(
        "causal_link",
        re(r"causally\s+(?:linked|connected|related)|caused\s+by\s+the\s+(?:delay|failure|negligence)"),
        15,
        "Causal link",
        "A causal link between the failure and the injury is asserted",
    )
    .push(
        "deterioration",
        re(r"deteriorat(?:ed|ion)"),
        10,
        "Deterioration",
        "The patient's condition deteriorated during the relevant period",
    );
    set
});

pub static HARM_PATTERNS: Lazy<PatternSet> = Lazy::new(|| {
    let mut set = PatternSet::new(Dimension::Harm, HARM_SEVERITY).with_top_band(DimensionLevel::Present);
    set.push(
        "fatal",
        re(r"\b(?:died|death|fatal(?:ity)?)\b"),
        40,
        "Fatal outcome",
        "The case involves a death",
    )
    .push(
        "amputation",
        re(r"\bamputat(?:ion|ed)\b"),
        35,
        "Amputation",
        "The injury resulted in amputation",
    )
    .push(
        "permanent_injury",
        re(r"permanent\s+(?:damage|injury|disability|impairment|scarring)"),
        30,
        "Permanent injury",
        "The injury is described as permanent",
    )
    .push(
        "further_surgery",
        re(r"(?:required|requiring|underwent|needed)\s+(?:further\s+|corrective\s+|additional\s+|revision\s+)?surgery"),
        25,
        "Further surgery",
        "Additional surgery was needed",
    )
    .push(
        "loss_of_earnings",
        re(r"loss\s+of\s+(?:earnings|income)"),
        20,
        "Loss of earnings",
        "The claimant has lost earnings",
    )
    .push(
        "psychiatric_injury",
        re(r"\bptsd\b|post-?traumatic\s+stress|psychiatric\s+injury"),
        20,
        "Psychiatric injury",
        "A psychiatric injury is reported",
    )
    .push(
        "chronic_pain",
        lit("chronic pain"),
        20,
        "Chronic pain",
        "The claimant suffers chronic pain",
    )
    .push(
        "prolonged_recovery",
        re(r"prolonged\s+(?:recovery|hospital\s+stay|admission|rehabilitation)"),
        15,
        "Prolonged recovery",
        "Recovery or admission was prolonged",
    )
    .push(
        "reduced_mobility",
        re(r"(?:reduced|restricted|loss\s+of)\s+mobility"),
        15,
        "Reduced mobility",
        "Mobility is reduced",
    );
    set
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use crate::service::scoring::{ScoringThresholds, score};

    const PREAMBLE: &str = "Chronology prepared from the GP records and the emergency department notes for the attendance on 4 March. ";

    #[test]
    fn test_tables_compile_with_unique_ids() {
        for set in [&*BREACH_PATTERNS, &*CAUSATION_PATTERNS, &*HARM_PATTERNS] {
            assert!(!set.patterns.is_empty());
            let mut ids: Vec<_> = set.patterns.iter().map(|p| p.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), set.patterns.len(), "duplicate id in {:?}", set.dimension);
        }
    }

    #[test]
    fn test_breach_scenario_fracture_and_referral() {
        let corpus = format!(
            "{}Radiology report: no fracture seen. The clinician failed to refer the patient to orthopaedics.",
            PREAMBLE
        );
        let result = score(&corpus, &BREACH_PATTERNS, &ScoringThresholds::default());

        assert_eq!(result.score, 45);
        assert_eq!(result.level, DimensionLevel::Medium);
        assert_eq!(result.flags.len(), 2);
        assert_eq!(result.flags[0].severity, Severity::High);
        assert_eq!(result.flags[1].severity, Severity::Medium);
    }

    #[test]
    fn test_harm_uses_higher_cutoff() {
        let corpus = format!("{}She required further surgery and now has permanent scarring.", PREAMBLE);
        let result = score(&corpus, &HARM_PATTERNS, &ScoringThresholds::default());

        assert_eq!(result.score, 55);
        assert_eq!(result.level, DimensionLevel::Present);
        let surgery = result.flags.iter().find(|f| f.id == "harm:further_surgery").unwrap();
        let permanent = result.flags.iter().find(|f| f.id == "harm:permanent_injury").unwrap();
        assert_eq!(surgery.severity, Severity::Medium);
        assert_eq!(permanent.severity, Severity::High);
    }

    #[test]
    fn test_dimensions_are_disjoint_on_plain_text() {
        let corpus = format!("{}The claim was acknowledged by the defendant's solicitors.", PREAMBLE);
        for set in [&*BREACH_PATTERNS, &*CAUSATION_PATTERNS, &*HARM_PATTERNS] {
            assert!(!score(&corpus, set, &ScoringThresholds::default()).detected);
        }
    }
}
