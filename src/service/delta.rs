//! Structured diff between two consecutive analysis versions

use std::collections::HashSet;

use crate::model::{
    AnalysisDelta, AnalysisVersion, CaseMomentum, DeltaReport, KeyIssue, MissingEvidence,
    MomentumTransition, TransitionKind,
};

pub fn transition(from: CaseMomentum, to: CaseMomentum) -> MomentumTransition {
    let (kind, note) = if from == CaseMomentum::StrongExpertPending && to == CaseMomentum::Strong {
        (
            TransitionKind::ExpertConfirmed,
            "An expert report has been detected; the case has moved from STRONG_EXPERT_PENDING to STRONG"
                .to_string(),
        )
    } else if from == to {
        (TransitionKind::Unchanged, format!("Momentum unchanged at {}", to))
    } else if to.rank() > from.rank() {
        (TransitionKind::Improved, format!("Momentum improved from {} to {}", from, to))
    } else {
        (TransitionKind::Declined, format!("Momentum declined from {} to {}", from, to))
    };

    MomentumTransition { from, to, kind, note }
}

/// Items of `next` absent from `previous`, in `next` order
fn added_by<'a, T: Clone, K: Eq + std::hash::Hash>(
    previous: &'a [T],
    next: &'a [T],
    key: impl Fn(&'a T) -> K,
) -> Vec<T> {
    let seen: HashSet<K> = previous.iter().map(&key).collect();
    next.iter().filter(|item| !seen.contains(&key(*item))).cloned().collect()
}

fn issue_key(issue: &KeyIssue) -> &str {
    issue.id.as_str()
}

fn evidence_key(item: &MissingEvidence) -> (&str, &str) {
    (item.area.as_str(), item.label.as_str())
}

fn report(previous: &AnalysisVersion, next: &AnalysisVersion) -> DeltaReport {
    let (prev, cur) = (&previous.result, &next.result);

    DeltaReport {
        from_version: previous.version_number,
        to_version: next.version_number,
        momentum: transition(previous.momentum(), next.momentum()),
        key_issues_added: added_by(&prev.key_issues, &cur.key_issues, issue_key),
        key_issues_removed: added_by(&cur.key_issues, &prev.key_issues, issue_key),
        missing_evidence_added: added_by(&prev.missing_evidence, &cur.missing_evidence, evidence_key),
        missing_evidence_resolved: added_by(&cur.missing_evidence, &prev.missing_evidence, evidence_key),
        documents_added: added_by(&previous.document_ids, &next.document_ids, String::as_str),
        documents_removed: added_by(&next.document_ids, &previous.document_ids, String::as_str),
    }
}

/// Compare `next` against the version before it.
///
/// With no previous version the result is [`AnalysisDelta::FirstAnalysis`],
/// never an empty report.
pub fn compute_delta(previous: Option<&AnalysisVersion>, next: &AnalysisVersion) -> AnalysisDelta {
    let Some(previous) = previous else {
        return AnalysisDelta::FirstAnalysis;
    };

    let report = report(previous, next);
    if report.is_empty() {
        AnalysisDelta::Unchanged(report)
    } else {
        AnalysisDelta::Changed(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn sample_result(state: CaseMomentum) -> AnalysisResult {
        let dim = |d| DimensionResult::not_detected(d);
        AnalysisResult {
            momentum: MomentumAssessment {
                state,
                breach_detected: false,
                causation_detected: false,
                harm_detected: false,
                expert_present: false,
                rationale: String::new(),
                locked_options: Vec::new(),
            },
            breach: dim(Dimension::Breach),
            causation: dim(Dimension::Causation),
            harm: dim(Dimension::Harm),
            expert_presence: dim(Dimension::ExpertPresence),
            evidence_strength: crate::service::strength::calibrate(
                "",
                None,
                &crate::service::scoring::ScoringThresholds::default(),
            ),
            opponent_activity: None,
            summary: String::new(),
            key_issues: Vec::new(),
            timeline: Vec::new(),
            missing_evidence: Vec::new(),
        }
    }

    pub(crate) fn sample_version(case_id: &str, number: i32, result: AnalysisResult) -> AnalysisVersion {
        AnalysisVersion {
            case_id: case_id.to_string(),
            version_number: number,
            document_ids: vec!["doc-1".to_string()],
            document_set_hash: String::new(),
            result,
            analysis_delta: AnalysisDelta::FirstAnalysis,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn issue(id: &str) -> KeyIssue {
        KeyIssue {
            id: id.to_string(),
            label: id.to_uppercase(),
        }
    }

    fn missing(area: &str, label: &str) -> MissingEvidence {
        MissingEvidence {
            area: area.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_first_analysis_is_not_unchanged() {
        let v1 = sample_version("case-1", 1, sample_result(CaseMomentum::Weak));
        assert_eq!(compute_delta(None, &v1), AnalysisDelta::FirstAnalysis);
    }

    #[test]
    fn test_self_delta_is_unchanged() {
        let mut result = sample_result(CaseMomentum::Balanced);
        result.key_issues = vec![issue("missed-fracture")];
        result.missing_evidence = vec![missing("expert", "Independent expert report")];
        let v = sample_version("case-1", 2, result);

        let delta = compute_delta(Some(&v), &v);
        let AnalysisDelta::Unchanged(report) = &delta else {
            panic!("expected unchanged, got {:?}", delta);
        };
        assert_eq!(report.momentum.kind, TransitionKind::Unchanged);
        assert!(report.is_empty());
    }

    #[test]
    fn test_expert_confirmed_transition() {
        let mut before = sample_result(CaseMomentum::StrongExpertPending);
        before.missing_evidence = vec![missing("expert", "Independent expert report")];
        let v1 = sample_version("case-1", 1, before);

        let mut v2 = sample_version("case-1", 2, sample_result(CaseMomentum::Strong));
        v2.document_ids.push("doc-expert".to_string());

        let delta = compute_delta(Some(&v1), &v2);
        let report = delta.report().unwrap();
        assert!(matches!(delta, AnalysisDelta::Changed(_)));
        assert_eq!(report.momentum.kind, TransitionKind::ExpertConfirmed);
        assert_eq!(report.momentum.from, CaseMomentum::StrongExpertPending);
        assert_eq!(report.momentum.to, CaseMomentum::Strong);
        assert_eq!(
            report.missing_evidence_resolved,
            vec![missing("expert", "Independent expert report")]
        );
        assert_eq!(report.documents_added, vec!["doc-expert"]);
        assert_eq!((report.from_version, report.to_version), (1, 2));
    }

    #[test]
    fn test_key_issue_set_difference_by_id() {
        let mut before = sample_result(CaseMomentum::Balanced);
        before.key_issues = vec![issue("a"), issue("b")];
        let mut after = sample_result(CaseMomentum::Balanced);
        after.key_issues = vec![
            issue("b"),
            KeyIssue {
                id: "a".to_string(),
                label: "relabelled".to_string(),
            },
            issue("c"),
        ];

        let v1 = sample_version("case-1", 1, before);
        let v2 = sample_version("case-1", 2, after);
        let report = compute_delta(Some(&v1), &v2).report().cloned().unwrap();

        assert_eq!(report.key_issues_added, vec![issue("c")]);
        assert!(report.key_issues_removed.is_empty());
    }

    #[test]
    fn test_transition_kinds() {
        assert_eq!(
            transition(CaseMomentum::Weak, CaseMomentum::Balanced).kind,
            TransitionKind::Improved
        );
        assert_eq!(
            transition(CaseMomentum::Strong, CaseMomentum::StrongExpertPending).kind,
            TransitionKind::Declined
        );
        assert_eq!(
            transition(CaseMomentum::Balanced, CaseMomentum::Strong).kind,
            TransitionKind::Improved
        );
    }
}
