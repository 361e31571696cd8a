//! Expert-report presence detection
//!
//! Unlike the weighted dimensions this is a conjunctive gate: words such as
//! "causation" or "prognosis" are everyday legal vocabulary, so a report is only
//! considered present once several distinct indicators agree.

use once_cell::sync::Lazy;

use super::patterns::re;
use super::{MAX_SCORE, Matcher, ScoringThresholds, SeverityThresholds, WeightedPattern};
use crate::model::{Dimension, DimensionLevel, DimensionResult, EvidenceFlag};

/// Distinct indicators required before an expert report counts as present
pub const MIN_DISTINCT_INDICATORS: usize = 3;

const EXPERT_SEVERITY: SeverityThresholds = SeverityThresholds { high: 25, medium: 20 };

/// Where an indicator is looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpertSignal {
    Content,
    Filename,
}

#[derive(Debug, Clone)]
pub struct ExpertIndicator {
    pub signal: ExpertSignal,
    pub pattern: WeightedPattern,
}

#[derive(Debug, Clone)]
pub struct ExpertDetector {
    indicators: Vec<ExpertIndicator>,
    min_distinct: usize,
}

impl ExpertDetector {
    pub fn new(min_distinct: usize) -> Self {
        Self {
            indicators: Vec::new(),
            min_distinct,
        }
    }

    pub fn indicator(
        mut self,
        signal: ExpertSignal,
        id: &str,
        matcher: Matcher,
        weight: u32,
        label: &str,
    ) -> Self {
        self.indicators.push(ExpertIndicator {
            signal,
            pattern: WeightedPattern {
                id: id.to_string(),
                matcher,
                weight,
                label: label.to_string(),
                reasoning: format!("Expert-report indicator: {}", label.to_lowercase()),
            },
        });
        self
    }

    /// Run the gate over the corpus and the case's document names.
    ///
    /// Below the gate the result is "not detected" with no flags; the partial
    /// matches are still listed in `indicators`.
    pub fn detect(
        &self,
        corpus: &str,
        document_names: &[String],
        thresholds: &ScoringThresholds,
    ) -> DimensionResult {
        if !thresholds.is_sufficient(corpus) {
            return DimensionResult::not_detected(Dimension::ExpertPresence);
        }

        let lowered = corpus.to_lowercase();
        let names: Vec<String> = document_names.iter().map(|n| n.to_lowercase()).collect();

        let matched: Vec<&WeightedPattern> = self
            .indicators
            .iter()
            .filter(|indicator| match indicator.signal {
                ExpertSignal::Content => indicator.pattern.matcher.is_match(&lowered),
                ExpertSignal::Filename => names.iter().any(|n| indicator.pattern.matcher.is_match(n)),
            })
            .map(|indicator| &indicator.pattern)
            .collect();

        let indicators: Vec<String> = matched.iter().map(|p| p.label.clone()).collect();

        if matched.len() < self.min_distinct {
            tracing::debug!(
                matched = matched.len(),
                required = self.min_distinct,
                "Expert indicators below gate"
            );
            return DimensionResult {
                indicators,
                ..DimensionResult::not_detected(Dimension::ExpertPresence)
            };
        }

        let score = matched
            .iter()
            .fold(0u32, |acc, p| acc.saturating_add(p.weight))
            .min(MAX_SCORE);

        let flags = matched
            .iter()
            .map(|p| EvidenceFlag {
                id: format!("{}:{}", Dimension::ExpertPresence, p.id),
                label: p.label.clone(),
                severity: EXPERT_SEVERITY.severity_for(p.weight),
                reasoning: p.reasoning.clone(),
                dimension: Dimension::ExpertPresence,
            })
            .collect();

        DimensionResult {
            dimension: Dimension::ExpertPresence,
            score,
            level: thresholds.band(score, DimensionLevel::High),
            detected: true,
            flags,
            indicators,
        }
    }
}

pub static EXPERT_DETECTOR: Lazy<ExpertDetector> = Lazy::new(|| {
    use ExpertSignal::{Content, Filename};

    ExpertDetector::new(MIN_DISTINCT_INDICATORS)
        .indicator(Content, "opinion", re(r"in\s+my\s+(?:professional\s+|expert\s+)?opinion"), 25, "Opinion phrasing")
        .indicator(Content, "standard_of_care", Matcher::literal("standard of care"), 20, "Standard of care")
        .indicator(Content, "causation", Matcher::literal("causation"), 15, "Causation analysis")
        .indicator(Content, "prognosis", Matcher::literal("prognosis"), 15, "Prognosis")
        .indicator(Content, "expert_report", re(r"expert\s+(?:report|witness|evidence)"), 25, "Expert report reference")
        .indicator(Content, "instructions", re(r"\b(?:i\s+(?:have\s+been|was|am)\s+)?instructed\s+by\b"), 20, "Letter of instruction")
        .indicator(Content, "statement_of_truth", Matcher::literal("statement of truth"), 20, "Statement of truth")
        .indicator(Content, "duty_to_court", re(r"(?:my|overriding)\s+duty\s+(?:is\s+)?to\s+the\s+court"), 25, "Duty to the court")
        .indicator(Content, "responsible_body", re(r"responsible\s+body\s+of\s+(?:medical\s+)?(?:opinion|practitioners)|\bbolam\b"), 20, "Responsible body of opinion")
        .indicator(Filename, "filename_expert", re(r"\bexpert\b"), 25, "Expert document name")
        .indicator(Filename, "filename_medico_legal", re(r"medico[\s_-]?legal|\bmlr\b"), 25, "Medico-legal report name")
        .indicator(Filename, "filename_part_35", re(r"part[\s_-]?35"), 20, "Part 35 document name")
});

/// Detect an expert report with the process-wide indicator table
pub fn detect_expert_presence(
    corpus: &str,
    document_names: &[String],
    thresholds: &ScoringThresholds,
) -> DimensionResult {
    EXPERT_DETECTOR.detect(corpus, document_names, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "Witness statement of the claimant describing the events at the walk-in centre and the following weeks of pain. ";

    #[test]
    fn test_single_indicator_repeated_is_not_present() {
        let corpus = format!("{}causation causation causation causation", BASE);
        let result = detect_expert_presence(&corpus, &[], &ScoringThresholds::default());

        assert!(!result.detected);
        assert_eq!(result.level, DimensionLevel::None);
        assert!(result.flags.is_empty());
        assert_eq!(result.indicators, vec!["Causation analysis"]);
    }

    #[test]
    fn test_two_indicators_are_not_enough() {
        let corpus = format!("{}The prognosis is guarded and causation is disputed.", BASE);
        let result = detect_expert_presence(&corpus, &[], &ScoringThresholds::default());

        assert!(!result.detected);
        assert_eq!(result.indicators.len(), 2);
    }

    #[test]
    fn test_three_distinct_indicators_are_present() {
        let corpus = format!(
            "{}In my opinion the standard of care fell short. On causation, the delay made a difference.",
            BASE
        );
        let result = detect_expert_presence(&corpus, &[], &ScoringThresholds::default());

        assert!(result.detected);
        assert_eq!(result.flags.len(), 3);
        assert_eq!(result.score, 60);
        assert_eq!(result.level, DimensionLevel::High);
    }

    #[test]
    fn test_filename_signals_count_as_indicators() {
        let corpus = format!("{}The prognosis remains uncertain.", BASE);
        let names = vec!["Expert Report - Orthopaedics (Part 35).pdf".to_string()];
        let result = detect_expert_presence(&corpus, &names, &ScoringThresholds::default());

        assert!(result.detected);
        assert!(result.flags.iter().any(|f| f.id == "expert_presence:filename_expert"));
        assert!(result.flags.iter().any(|f| f.id == "expert_presence:filename_part_35"));
    }

    #[test]
    fn test_short_corpus_is_never_present() {
        let names = vec!["expert medico-legal part 35.pdf".to_string()];
        let result = detect_expert_presence("in my opinion", &names, &ScoringThresholds::default());
        assert!(!result.detected);
        assert!(result.indicators.is_empty());
    }
}
