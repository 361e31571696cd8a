//! Stable hashes used for correspondence dedup and document-set identity

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Characters of the normalized label that take part in the dedup key
const DEDUP_LABEL_CHARS: usize = 100;

/// Hash of a document-id set. Order of `ids` does not matter.
pub fn document_set_hash(ids: &[String]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    hash_string(&sorted.join(","))
}

/// Dedup key of a correspondence item: its calendar day plus the normalized
/// first characters of its label
pub fn correspondence_key(day: NaiveDate, label: &str) -> String {
    let normalized: String = normalize_label(label).chars().take(DEDUP_LABEL_CHARS).collect();
    hash_string(&format!("{}|{}", day.format("%Y-%m-%d"), normalized))
}

/// Lower-case, punctuation to spaces, whitespace collapsed
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hash a string to a hex string using SHA256
fn hash_string(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_set_hash_ignores_order() {
        let a = vec!["doc-2".to_string(), "doc-1".to_string()];
        let b = vec!["doc-1".to_string(), "doc-2".to_string()];
        assert_eq!(document_set_hash(&a), document_set_hash(&b));
        assert_ne!(document_set_hash(&a), document_set_hash(&b[..1]));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  RE: Letter of Claim -- (draft) "), "re letter of claim draft");
    }

    #[test]
    fn test_correspondence_key_is_per_day() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        assert_eq!(
            correspondence_key(d1, "Re: Letter of claim"),
            correspondence_key(d1, "RE - letter of claim!")
        );
        assert_ne!(
            correspondence_key(d1, "Re: Letter of claim"),
            correspondence_key(d2, "Re: Letter of claim")
        );
    }

    #[test]
    fn test_correspondence_key_uses_label_prefix() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let prefix = "x".repeat(DEDUP_LABEL_CHARS);
        assert_eq!(
            correspondence_key(day, &format!("{} first tail", prefix)),
            correspondence_key(day, &format!("{} other tail", prefix))
        );
    }
}
