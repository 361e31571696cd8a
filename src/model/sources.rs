//! Records read from the case stores that feed an analysis run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A case document as seen by the engine. Binary content is never loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDocument {
    pub id: String,
    pub name: String,
    pub doc_type: Option<String>,
    /// Raw extracted-fact payload; parse with [`ExtractedFacts::from_value`]
    pub extracted_facts: Option<Value>,
    pub ai_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleChunk {
    pub raw_text: Option<String>,
    pub ai_summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseNote {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A letter drafted from a template inside the case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLetter {
    pub id: String,
    pub template: Option<String>,
    pub subject: Option<String>,
    pub recipient: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of an extracted-fact list (`keyIssues` or `timeline`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactItem {
    pub id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl FactItem {
    /// `label`, falling back to `description`
    pub fn text(&self) -> Option<&str> {
        self.label
            .as_deref()
            .or(self.description.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FactItem {
                label: Some(s.clone()),
                ..Default::default()
            }),
            Value::Object(map) => {
                let field = |name: &str| match map.get(name) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                };
                let item = FactItem {
                    id: field("id"),
                    label: field("label"),
                    description: field("description"),
                    date: field("date"),
                };
                item.text().is_some().then_some(item)
            }
            _ => None,
        }
    }
}

/// The named fields the engine reads from an extracted-fact payload.
///
/// The payload is produced upstream and its shape is not guaranteed, so every
/// field is parsed on its own and a wrong-typed field is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFacts {
    pub summary: Option<String>,
    pub key_issues: Vec<FactItem>,
    pub timeline: Vec<FactItem>,
}

impl ExtractedFacts {
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let summary = match map.get("summary") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        };

        Self {
            summary,
            key_issues: Self::items(map.get("keyIssues").or_else(|| map.get("key_issues"))),
            timeline: Self::items(map.get("timeline")),
        }
    }

    fn items(value: Option<&Value>) -> Vec<FactItem> {
        match value {
            Some(Value::Array(entries)) => entries.iter().filter_map(FactItem::from_value).collect(),
            Some(single @ Value::String(_)) => FactItem::from_value(single).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_falls_back_to_description() {
        let facts = ExtractedFacts::from_value(&json!({
            "keyIssues": [
                {"id": "ki-1", "label": "Missed fracture"},
                {"description": "Delay in referral"},
                "Discharged without imaging"
            ]
        }));

        let texts: Vec<_> = facts.key_issues.iter().filter_map(|i| i.text()).collect();
        assert_eq!(
            texts,
            vec!["Missed fracture", "Delay in referral", "Discharged without imaging"]
        );
        assert_eq!(facts.key_issues[0].id.as_deref(), Some("ki-1"));
    }

    #[test]
    fn test_malformed_fields_are_ignored() {
        let facts = ExtractedFacts::from_value(&json!({
            "summary": 42,
            "keyIssues": {"not": "a list"},
            "timeline": [null, 7, {"date": "2024-01-01"}, {"label": "A&E attendance"}]
        }));

        assert!(facts.summary.is_none());
        assert!(facts.key_issues.is_empty());
        assert_eq!(facts.timeline.len(), 1);
        assert_eq!(facts.timeline[0].text(), Some("A&E attendance"));
    }

    #[test]
    fn test_non_object_payload_is_empty() {
        assert_eq!(ExtractedFacts::from_value(&json!("free text")), ExtractedFacts::default());
        assert_eq!(ExtractedFacts::from_value(&Value::Null), ExtractedFacts::default());
    }
}
