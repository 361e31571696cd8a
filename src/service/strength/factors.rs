//! The six factor analyzers
//!
//! Each factor reads boolean signals from the lower-cased corpus and turns them
//! into a 0–100 sub-score with fixed increments.

use crate::model::{
    DisclosureFactor, ForensicsFactor, IdentificationFactor, MedicalFactor, ProceduralFactor,
    WitnessFactor,
};

/// Bonus added when at least this many signals of one factor co-occur
const CORROBORATION_SIGNALS: usize = 3;
const CORROBORATION_BONUS: u32 = 10;

/// Procedural strength at which compliance counts as high
pub const HIGH_COMPLIANCE: u32 = 60;

/// Penalty applied to the disclosure factor when a critical gap is found
const DISCLOSURE_GAP_PENALTY: u32 = 40;

const CCTV_TERMS: &[&str] = &["cctv", "surveillance footage", "body-worn", "body worn", "dashcam"];
const WITNESS_ID_TERMS: &[&str] = &[
    "identified by",
    "picked out",
    "recognised the",
    "recognized the",
    "positive identification",
];
const FACIAL_RECOGNITION_TERMS: &[&str] = &["facial recognition", "facial comparison", "face match"];
const FORMAL_PROCEDURE_TERMS: &[&str] = &[
    "identification parade",
    "id parade",
    "viper",
    "video identification",
    "code d",
];

const DNA_TERMS: &[&str] = &["dna", "genetic profile"];
const FINGERPRINT_TERMS: &[&str] = &["fingerprint", "finger mark", "palm print"];
const FORENSIC_REPORT_TERMS: &[&str] = &["forensic report", "forensic scientist", "forensic analysis", "toxicology"];
const DIGITAL_TERMS: &[&str] = &[
    "phone download",
    "cell site",
    "call data",
    "digital forensic",
    "metadata",
    "gps data",
];

const INDEPENDENT_WITNESS_TERMS: &[&str] = &["independent witness", "bystander", "passer-by", "passerby"];
const MULTIPLE_WITNESS_TERMS: &[&str] = &["witnesses", "several witnesses", "two witnesses", "three witnesses"];
const CONSISTENT_ACCOUNT_TERMS: &[&str] = &["consistent account", "accounts are consistent", "corroborat"];
const OFFICIAL_WITNESS_TERMS: &[&str] = &["officer witnessed", "police witness", "attending officer", "pc "];

const STATUTORY_COMPLIANCE_TERMS: &[&str] = &[
    "pace compliant",
    "in accordance with pace",
    "complied with",
    "code of practice",
    "compliant with",
];
const CAUTION_TERMS: &[&str] = &["was cautioned", "under caution", "caution was given"];
const RECORDED_INTERVIEW_TERMS: &[&str] = &["recorded interview", "interview was recorded", "taped interview", "interview transcript"];
const REPRESENTATION_TERMS: &[&str] = &["solicitor present", "legal representative", "duty solicitor", "legal advice"];

const MEDICAL_RECORD_TERMS: &[&str] = &["medical records", "gp records", "hospital records", "clinical notes"];
const INJURY_TERMS: &[&str] = &["injuries documented", "documented injur", "injury noted", "bruising", "laceration", "fracture"];
const MEDICAL_EXPERT_TERMS: &[&str] = &["medical expert", "consultant report", "medico-legal", "medicolegal"];
const INJURY_PHOTO_TERMS: &[&str] = &["photographs of the injur", "injury photographs", "photos of the injur", "medical photography"];

const DISCLOSURE_TERMS: &[&str] = &["disclosure", "disclosed"];
const UNUSED_SCHEDULE_TERMS: &[&str] = &["unused material", "schedule of unused", "mg6c", "disclosure schedule"];
const DISCLOSURE_COMPLETE_TERMS: &[&str] = &["disclosure is complete", "full disclosure", "disclosure complete"];
const DISCLOSURE_GAP_TERMS: &[&str] = &[
    "outstanding disclosure",
    "not been disclosed",
    "not disclosed",
    "failed to disclose",
    "failure to disclose",
    "disclosure failure",
    "withheld",
];

fn any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Sum the increments of the signals present, with the corroboration bonus
fn strength_from(signals: &[(bool, u32)]) -> u32 {
    let present = signals.iter().filter(|(on, _)| *on).count();
    let base: u32 = signals.iter().filter(|(on, _)| *on).map(|(_, inc)| inc).sum();
    let bonus = if present >= CORROBORATION_SIGNALS {
        CORROBORATION_BONUS
    } else {
        0
    };
    (base + bonus).min(100)
}

pub fn identification(text: &str) -> IdentificationFactor {
    let has_cctv = any(text, CCTV_TERMS);
    let has_witness_identification = any(text, WITNESS_ID_TERMS);
    let has_facial_recognition = any(text, FACIAL_RECOGNITION_TERMS);
    let has_formal_procedure = any(text, FORMAL_PROCEDURE_TERMS);

    IdentificationFactor {
        strength: strength_from(&[
            (has_cctv, 25),
            (has_witness_identification, 20),
            (has_facial_recognition, 25),
            (has_formal_procedure, 20),
        ]),
        has_cctv,
        has_witness_identification,
        has_facial_recognition,
        has_formal_procedure,
    }
}

pub fn forensics(text: &str) -> ForensicsFactor {
    let has_dna = any(text, DNA_TERMS);
    let has_fingerprints = any(text, FINGERPRINT_TERMS);
    let has_forensic_report = any(text, FORENSIC_REPORT_TERMS);
    let has_digital_evidence = any(text, DIGITAL_TERMS);

    ForensicsFactor {
        strength: strength_from(&[
            (has_dna, 35),
            (has_fingerprints, 25),
            (has_forensic_report, 20),
            (has_digital_evidence, 20),
        ]),
        has_dna,
        has_fingerprints,
        has_forensic_report,
        has_digital_evidence,
    }
}

pub fn witnesses(text: &str) -> WitnessFactor {
    let has_independent_witness = any(text, INDEPENDENT_WITNESS_TERMS);
    let has_multiple_witnesses = any(text, MULTIPLE_WITNESS_TERMS);
    let has_consistent_accounts = any(text, CONSISTENT_ACCOUNT_TERMS);
    let has_official_witness = any(text, OFFICIAL_WITNESS_TERMS);

    WitnessFactor {
        strength: strength_from(&[
            (has_independent_witness, 30),
            (has_multiple_witnesses, 25),
            (has_consistent_accounts, 20),
            (has_official_witness, 15),
        ]),
        has_independent_witness,
        has_multiple_witnesses,
        has_consistent_accounts,
        has_official_witness,
    }
}

pub fn procedural(text: &str) -> ProceduralFactor {
    let has_statutory_compliance = any(text, STATUTORY_COMPLIANCE_TERMS);
    let has_caution = any(text, CAUTION_TERMS);
    let has_recorded_interview = any(text, RECORDED_INTERVIEW_TERMS);
    let has_legal_representation = any(text, REPRESENTATION_TERMS);

    let strength = strength_from(&[
        (has_statutory_compliance, 30),
        (has_caution, 20),
        (has_recorded_interview, 25),
        (has_legal_representation, 15),
    ]);

    ProceduralFactor {
        strength,
        has_statutory_compliance,
        has_caution,
        has_recorded_interview,
        has_legal_representation,
        high_compliance: strength >= HIGH_COMPLIANCE,
    }
}

pub fn medical(text: &str) -> MedicalFactor {
    let has_medical_records = any(text, MEDICAL_RECORD_TERMS);
    let has_documented_injuries = any(text, INJURY_TERMS);
    let has_medical_expert = any(text, MEDICAL_EXPERT_TERMS);
    let has_injury_photographs = any(text, INJURY_PHOTO_TERMS);

    MedicalFactor {
        strength: strength_from(&[
            (has_medical_records, 30),
            (has_documented_injuries, 25),
            (has_medical_expert, 25),
            (has_injury_photographs, 20),
        ]),
        has_medical_records,
        has_documented_injuries,
        has_medical_expert,
        has_injury_photographs,
    }
}

pub fn disclosure(text: &str) -> DisclosureFactor {
    let has_disclosure = any(text, DISCLOSURE_TERMS);
    let has_unused_schedule = any(text, UNUSED_SCHEDULE_TERMS);
    let disclosure_complete = any(text, DISCLOSURE_COMPLETE_TERMS);
    let critical_gap = any(text, DISCLOSURE_GAP_TERMS);

    let positive = strength_from(&[
        (has_disclosure, 30),
        (has_unused_schedule, 25),
        (disclosure_complete && !critical_gap, 35),
    ]);
    let strength = if critical_gap {
        positive.saturating_sub(DISCLOSURE_GAP_PENALTY)
    } else {
        positive
    };

    DisclosureFactor {
        strength,
        has_disclosure,
        has_unused_schedule,
        disclosure_complete: disclosure_complete && !critical_gap,
        critical_gap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identification_bonus_on_three_signals() {
        let two = identification("cctv footage shows the defendant; he was picked out by the victim");
        assert_eq!(two.strength, 45);

        let three = identification(
            "cctv footage shows the defendant; he was picked out at a viper identification parade",
        );
        assert!(three.has_formal_procedure);
        assert_eq!(three.strength, 25 + 20 + 20 + CORROBORATION_BONUS);
    }

    #[test]
    fn test_factor_is_capped() {
        let all = forensics("dna match, fingerprint on the handle, forensic report served, phone download attached");
        assert_eq!(all.strength, 100);
    }

    #[test]
    fn test_high_compliance_threshold() {
        let f = procedural("the interview was recorded under caution with a duty solicitor present");
        assert!(f.has_caution && f.has_recorded_interview && f.has_legal_representation);
        assert_eq!(f.strength, 20 + 25 + 15 + CORROBORATION_BONUS);
        assert!(f.high_compliance);

        let low = procedural("the defendant was cautioned");
        assert!(!low.high_compliance);
    }

    #[test]
    fn test_disclosure_gap_overrides_completeness() {
        let f = disclosure("disclosure complete save that the custody record has not been disclosed");
        assert!(f.critical_gap);
        assert!(!f.disclosure_complete);
        assert_eq!(f.strength, 0);
    }

    #[test]
    fn test_no_signals_is_zero() {
        assert_eq!(medical("nothing relevant here").strength, 0);
        assert_eq!(witnesses("nothing relevant here").strength, 0);
    }
}
