//! Pattern-weighted scoring shared by the breach, causation and harm analyzers
//!
//! A [`PatternSet`] is declarative data: each entry carries a matcher, a weight,
//! a label and the reasoning shown to the user. [`score`] runs one set over a
//! corpus and is a pure function of its inputs.

pub mod expert;
pub mod patterns;

use regex::{Regex, RegexBuilder};

use crate::model::{AnalysisSettings, Dimension, DimensionLevel, DimensionResult, EvidenceFlag, Severity};

pub use expert::detect_expert_presence;

/// Characters counted against the corpus floor
pub fn corpus_chars(corpus: &str) -> usize {
    corpus.trim().chars().count()
}

/// Maximum score of any dimension
pub const MAX_SCORE: u32 = 100;

/// How a pattern is tested against the lower-cased corpus
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Substring containment
    Literal(String),
    /// Case-insensitive regex search
    Pattern(Regex),
}

impl Matcher {
    pub fn literal(text: &str) -> Self {
        Matcher::Literal(text.to_lowercase())
    }

    /// Compile a case-insensitive pattern
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map(Matcher::Pattern)
    }

    pub fn is_match(&self, lowered_corpus: &str) -> bool {
        match self {
            Matcher::Literal(text) => lowered_corpus.contains(text.as_str()),
            Matcher::Pattern(regex) => regex.is_match(lowered_corpus),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightedPattern {
    pub id: String,
    pub matcher: Matcher,
    pub weight: u32,
    pub label: String,
    pub reasoning: String,
}

/// Per-flag severity cutoffs, applied to the pattern's own weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityThresholds {
    pub high: u32,
    pub medium: u32,
}

impl SeverityThresholds {
    pub fn severity_for(&self, weight: u32) -> Severity {
        if weight >= self.high {
            Severity::High
        } else if weight >= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternSet {
    pub dimension: Dimension,
    pub patterns: Vec<WeightedPattern>,
    pub severity: SeverityThresholds,
    /// Label of the top band: `High`, or `Present` for harm
    pub top_band: DimensionLevel,
}

impl PatternSet {
    pub fn new(dimension: Dimension, severity: SeverityThresholds) -> Self {
        Self {
            dimension,
            patterns: Vec::new(),
            severity,
            top_band: DimensionLevel::High,
        }
    }

    pub fn with_top_band(mut self, top_band: DimensionLevel) -> Self {
        self.top_band = top_band;
        self
    }

    pub fn push(
        &mut self,
        id: &str,
        matcher: Matcher,
        weight: u32,
        label: &str,
        reasoning: &str,
    ) -> &mut Self {
        self.patterns.push(WeightedPattern {
            id: id.to_string(),
            matcher,
            weight,
            label: label.to_string(),
            reasoning: reasoning.to_string(),
        });
        self
    }
}

/// Corpus floor and total-score banding shared by every dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringThresholds {
    pub min_corpus_chars: usize,
    pub low_below: u32,
    pub medium_below: u32,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            min_corpus_chars: 100,
            low_below: 20,
            medium_below: 50,
        }
    }
}

impl ScoringThresholds {
    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self {
            min_corpus_chars: settings.min_corpus_chars,
            ..Self::default()
        }
    }

    /// Whether a corpus is long enough to be pattern-matched at all
    pub fn is_sufficient(&self, corpus: &str) -> bool {
        corpus_chars(corpus) >= self.min_corpus_chars
    }

    pub fn band(&self, score: u32, top_band: DimensionLevel) -> DimensionLevel {
        if score == 0 {
            DimensionLevel::None
        } else if score < self.low_below {
            DimensionLevel::Low
        } else if score < self.medium_below {
            DimensionLevel::Medium
        } else {
            top_band
        }
    }
}

/// Score one dimension.
///
/// Each pattern contributes its weight at most once however often it occurs.
/// The total is capped at [`MAX_SCORE`]; severities come from each pattern's
/// own weight, the level from the capped total.
pub fn score(corpus: &str, set: &PatternSet, thresholds: &ScoringThresholds) -> DimensionResult {
    if !thresholds.is_sufficient(corpus) {
        tracing::debug!(
            dimension = %set.dimension,
            corpus_chars = corpus_chars(corpus),
            "Corpus below floor, reporting not detected"
        );
        return DimensionResult::not_detected(set.dimension);
    }

    let lowered = corpus.to_lowercase();
    let mut total: u32 = 0;
    let mut flags = Vec::new();
    let mut indicators = Vec::new();

    for pattern in set.patterns.iter().filter(|p| p.matcher.is_match(&lowered)) {
        total = total.saturating_add(pattern.weight);
        indicators.push(pattern.label.clone());
        flags.push(EvidenceFlag {
            id: format!("{}:{}", set.dimension, pattern.id),
            label: pattern.label.clone(),
            severity: set.severity.severity_for(pattern.weight),
            reasoning: pattern.reasoning.clone(),
            dimension: set.dimension,
        });
    }

    let score = total.min(MAX_SCORE);
    let level = thresholds.band(score, set.top_band);

    tracing::debug!(
        dimension = %set.dimension,
        score = score,
        matched = flags.len(),
        level = ?level,
        "Scored dimension"
    );

    DimensionResult {
        dimension: set.dimension,
        score,
        level,
        detected: !flags.is_empty(),
        flags,
        indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &str = "The claimant attended the emergency department and was reviewed by the duty registrar on the same evening.";

    fn sample_set() -> PatternSet {
        let mut set = PatternSet::new(
            Dimension::Breach,
            SeverityThresholds { high: 25, medium: 20 },
        );
        set.push("a", Matcher::literal("Alpha Signal"), 25, "Alpha", "alpha reasoning")
            .push("b", Matcher::pattern(r"beta\s+signal").unwrap(), 20, "Beta", "beta reasoning")
            .push("c", Matcher::literal("gamma"), 10, "Gamma", "gamma reasoning")
            .push("d", Matcher::literal("delta"), 60, "Delta", "delta reasoning");
        set
    }

    fn corpus(extra: &str) -> String {
        format!("{} {}", FILLER, extra)
    }

    #[test]
    fn test_short_corpus_is_not_detected() {
        let result = score("alpha signal delta", &sample_set(), &ScoringThresholds::default());

        assert_eq!(result.level, DimensionLevel::None);
        assert!(!result.detected);
        assert!(result.flags.is_empty());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_floor_counts_characters_not_bytes() {
        let accented = format!("  {}  ", "é".repeat(60));
        assert_eq!(accented.len(), 124);
        assert_eq!(corpus_chars(&accented), 60);
        assert!(!ScoringThresholds::default().is_sufficient(&accented));
    }

    #[test]
    fn test_repeated_match_counts_once() {
        let text = corpus("gamma gamma gamma gamma");
        let result = score(&text, &sample_set(), &ScoringThresholds::default());

        assert_eq!(result.score, 10);
        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.level, DimensionLevel::Low);
    }

    #[test]
    fn test_literal_and_pattern_are_case_insensitive() {
        let text = corpus("ALPHA SIGNAL and Beta   Signal");
        let result = score(&text, &sample_set(), &ScoringThresholds::default());

        assert_eq!(result.score, 45);
        assert_eq!(result.level, DimensionLevel::Medium);
        assert_eq!(result.flags[0].severity, Severity::High);
        assert_eq!(result.flags[1].severity, Severity::Medium);
        assert_eq!(result.flags[0].id, "breach:a");
        assert_eq!(result.indicators, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_score_is_capped() {
        let text = corpus("alpha signal, beta signal, gamma and delta");
        let result = score(&text, &sample_set(), &ScoringThresholds::default());

        assert_eq!(result.score, MAX_SCORE);
        assert_eq!(result.level, DimensionLevel::High);
        assert_eq!(result.flags.len(), 4);
    }

    #[test]
    fn test_score_never_decreases_as_matches_are_added() {
        let set = sample_set();
        let additions = [
            "",
            "gamma",
            "gamma alpha signal",
            "gamma alpha signal beta signal",
            "gamma alpha signal beta signal delta",
        ];
        let mut previous = 0;
        for extra in additions {
            let result = score(&corpus(extra), &set, &ScoringThresholds::default());
            let expected: u32 = set
                .patterns
                .iter()
                .filter(|p| result.flags.iter().any(|f| f.id == format!("breach:{}", p.id)))
                .map(|p| p.weight)
                .sum();
            assert!(result.score >= previous);
            assert_eq!(result.score, expected.min(MAX_SCORE));
            assert_eq!(result.detected, !result.flags.is_empty());
            assert_eq!(result.level == DimensionLevel::None, result.score == 0);
            previous = result.score;
        }
    }

    #[test]
    fn test_top_band_relabel() {
        let set = sample_set().with_top_band(DimensionLevel::Present);
        let result = score(&corpus("delta"), &set, &ScoringThresholds::default());

        assert_eq!(result.score, 60);
        assert_eq!(result.level, DimensionLevel::Present);
    }

    #[test]
    fn test_band_edges() {
        let t = ScoringThresholds::default();
        assert_eq!(t.band(0, DimensionLevel::High), DimensionLevel::None);
        assert_eq!(t.band(19, DimensionLevel::High), DimensionLevel::Low);
        assert_eq!(t.band(20, DimensionLevel::High), DimensionLevel::Medium);
        assert_eq!(t.band(49, DimensionLevel::High), DimensionLevel::Medium);
        assert_eq!(t.band(50, DimensionLevel::High), DimensionLevel::High);
    }
}
