//! Case momentum
//!
//! Momentum is re-derived from scratch on every run. It is a pure function of
//! the three detected dimensions and expert presence.

use crate::model::{CaseMomentum, DimensionResult, MomentumAssessment, StrategicOption};

/// The four inputs of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MomentumInputs {
    pub breach: bool,
    pub causation: bool,
    pub harm: bool,
    pub expert_present: bool,
}

impl MomentumInputs {
    pub fn from_results(
        breach: &DimensionResult,
        causation: &DimensionResult,
        harm: &DimensionResult,
        expert: &DimensionResult,
    ) -> Self {
        Self {
            breach: breach.detected,
            causation: causation.detected,
            harm: harm.detected,
            expert_present: expert.detected,
        }
    }

    fn detected_count(&self) -> usize {
        [self.breach, self.causation, self.harm]
            .into_iter()
            .filter(|d| *d)
            .count()
    }
}

/// Evaluate the rules in precedence order
pub fn derive_momentum(inputs: MomentumInputs) -> CaseMomentum {
    match (inputs.detected_count(), inputs.expert_present) {
        (3, true) => CaseMomentum::Strong,
        (3, false) => CaseMomentum::StrongExpertPending,
        (2, _) => CaseMomentum::Balanced,
        _ => CaseMomentum::Weak,
    }
}

/// Strategic options that stay unavailable in a state
pub fn locked_options(state: CaseMomentum) -> Vec<StrategicOption> {
    match state {
        CaseMomentum::Weak => vec![
            StrategicOption::LetterOfClaim,
            StrategicOption::SettlementOffer,
            StrategicOption::IssueProceedings,
        ],
        CaseMomentum::Balanced => vec![
            StrategicOption::SettlementOffer,
            StrategicOption::IssueProceedings,
        ],
        CaseMomentum::StrongExpertPending => vec![StrategicOption::IssueProceedings],
        CaseMomentum::Strong => Vec::new(),
    }
}

fn rationale(state: CaseMomentum, inputs: &MomentumInputs) -> String {
    let missing: Vec<&str> = [
        (inputs.breach, "breach"),
        (inputs.causation, "causation"),
        (inputs.harm, "harm"),
    ]
    .into_iter()
    .filter(|(detected, _)| !detected)
    .map(|(_, name)| name)
    .collect();

    match state {
        CaseMomentum::Strong => {
            "Breach, causation and harm are all evidenced and an expert report supports them".to_string()
        }
        CaseMomentum::StrongExpertPending => {
            "Breach, causation and harm are all evidenced; issuing proceedings waits on an expert report"
                .to_string()
        }
        CaseMomentum::Balanced => format!(
            "Two of three liability elements are evidenced; {} is not yet supported",
            missing.join(", ")
        ),
        CaseMomentum::Weak => format!(
            "Not enough of the liability elements are evidenced (missing: {})",
            missing.join(", ")
        ),
    }
}

pub fn assess(inputs: MomentumInputs) -> MomentumAssessment {
    let state = derive_momentum(inputs);
    MomentumAssessment {
        state,
        breach_detected: inputs.breach,
        causation_detected: inputs.causation,
        harm_detected: inputs.harm,
        expert_present: inputs.expert_present,
        rationale: rationale(state, &inputs),
        locked_options: locked_options(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(breach: bool, causation: bool, harm: bool, expert_present: bool) -> MomentumInputs {
        MomentumInputs {
            breach,
            causation,
            harm,
            expert_present,
        }
    }

    #[test]
    fn test_state_table() {
        assert_eq!(derive_momentum(inputs(true, true, true, true)), CaseMomentum::Strong);
        assert_eq!(
            derive_momentum(inputs(true, true, true, false)),
            CaseMomentum::StrongExpertPending
        );
        assert_eq!(derive_momentum(inputs(true, false, true, true)), CaseMomentum::Balanced);
        assert_eq!(derive_momentum(inputs(false, true, true, false)), CaseMomentum::Balanced);
        assert_eq!(derive_momentum(inputs(true, false, false, true)), CaseMomentum::Weak);
        assert_eq!(derive_momentum(MomentumInputs::default()), CaseMomentum::Weak);
    }

    #[test]
    fn test_is_pure_over_all_inputs() {
        for bits in 0u8..16 {
            let i = inputs(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            assert_eq!(derive_momentum(i), derive_momentum(i));
            assert_eq!(assess(i), assess(i));
        }
    }

    #[test]
    fn test_expert_flip_only_moves_pending_to_strong() {
        for bits in 0u8..8 {
            let without = inputs(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, false);
            let with = MomentumInputs {
                expert_present: true,
                ..without
            };
            let (before, after) = (derive_momentum(without), derive_momentum(with));
            if bits == 7 {
                assert_eq!(before, CaseMomentum::StrongExpertPending);
                assert_eq!(after, CaseMomentum::Strong);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_locks_shrink_as_momentum_rises() {
        let states = [
            CaseMomentum::Weak,
            CaseMomentum::Balanced,
            CaseMomentum::StrongExpertPending,
            CaseMomentum::Strong,
        ];
        for pair in states.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(locked_options(pair[0]).len() > locked_options(pair[1]).len());
        }
        assert_eq!(
            locked_options(CaseMomentum::StrongExpertPending),
            vec![StrategicOption::IssueProceedings]
        );
    }

    #[test]
    fn test_rationale_names_missing_element() {
        let assessment = assess(inputs(true, false, true, false));
        assert!(assessment.rationale.contains("causation"));
        assert!(!assessment.rationale.contains("harm"));
    }
}
