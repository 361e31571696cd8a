//! Database rows for case sources and analysis versions

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::model::{
    AnalysisDelta, AnalysisResult, AnalysisVersion, AnalysisVersionSummary, BundleChunk,
    CaseDocument, CaseMomentum, CaseNote, DraftLetter, TimelineEvent,
};

#[derive(Debug, Clone, FromRow)]
pub struct CaseDocumentRow {
    pub id: String,
    pub name: String,
    pub doc_type: Option<String>,
    pub extracted_facts: Option<serde_json::Value>,
    pub ai_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CaseDocumentRow> for CaseDocument {
    fn from(row: CaseDocumentRow) -> Self {
        CaseDocument {
            id: row.id,
            name: row.name,
            doc_type: row.doc_type,
            extracted_facts: row.extracted_facts,
            ai_summary: row.ai_summary,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BundleChunkRow {
    pub raw_text: Option<String>,
    pub ai_summary: Option<String>,
}

impl From<BundleChunkRow> for BundleChunk {
    fn from(row: BundleChunkRow) -> Self {
        BundleChunk {
            raw_text: row.raw_text,
            ai_summary: row.ai_summary,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TimelineEventRow {
    pub event_date: DateTime<Utc>,
    pub description: String,
}

impl From<TimelineEventRow> for TimelineEvent {
    fn from(row: TimelineEventRow) -> Self {
        TimelineEvent {
            date: row.event_date,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CaseNoteRow {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<CaseNoteRow> for CaseNote {
    fn from(row: CaseNoteRow) -> Self {
        CaseNote {
            id: row.id,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CaseLetterRow {
    pub id: String,
    pub template: Option<String>,
    pub subject: Option<String>,
    pub recipient: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CaseLetterRow> for DraftLetter {
    fn from(row: CaseLetterRow) -> Self {
        DraftLetter {
            id: row.id,
            template: row.template,
            subject: row.subject,
            recipient: row.recipient,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Database representation of an analysis version
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisVersionRow {
    pub case_id: String,
    pub version_number: i32,
    pub momentum: String,
    pub document_ids: serde_json::Value,
    pub document_set_hash: String,
    pub result: serde_json::Value,
    pub analysis_delta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AnalysisVersionRow {
    pub fn from_domain(version: &AnalysisVersion) -> Result<Self, String> {
        let to_json = |what: &str, value: Result<serde_json::Value, serde_json::Error>| {
            value.map_err(|e| format!("Failed to serialize {}: {}", what, e))
        };

        Ok(Self {
            case_id: version.case_id.clone(),
            version_number: version.version_number,
            momentum: version.momentum().as_str().to_string(),
            document_ids: to_json("document ids", serde_json::to_value(&version.document_ids))?,
            document_set_hash: version.document_set_hash.clone(),
            result: to_json("result", serde_json::to_value(&version.result))?,
            analysis_delta: to_json("delta", serde_json::to_value(&version.analysis_delta))?,
            created_at: version.created_at,
        })
    }

    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<AnalysisVersion, String> {
        let document_ids: Vec<String> = serde_json::from_value(self.document_ids)
            .map_err(|e| format!("Invalid document ids: {}", e))?;
        let result: AnalysisResult =
            serde_json::from_value(self.result).map_err(|e| format!("Invalid result: {}", e))?;
        let analysis_delta: AnalysisDelta = serde_json::from_value(self.analysis_delta)
            .map_err(|e| format!("Invalid delta: {}", e))?;

        Ok(AnalysisVersion {
            case_id: self.case_id,
            version_number: self.version_number,
            document_ids,
            document_set_hash: self.document_set_hash,
            result,
            analysis_delta,
            created_at: self.created_at,
        })
    }
}

/// Listing row; the full result is not loaded
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisVersionSummaryRow {
    pub case_id: String,
    pub version_number: i32,
    pub momentum: String,
    pub document_count: i32,
    pub created_at: DateTime<Utc>,
}

impl AnalysisVersionSummaryRow {
    pub fn into_domain(self) -> Result<AnalysisVersionSummary, String> {
        let momentum = CaseMomentum::parse(&self.momentum)
            .ok_or_else(|| format!("Unknown momentum state: {}", self.momentum))?;

        Ok(AnalysisVersionSummary {
            case_id: self.case_id,
            version_number: self.version_number,
            momentum,
            document_count: self.document_count.max(0) as usize,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::delta::tests::{sample_result, sample_version};

    #[test]
    fn test_version_row_round_trip_keeps_delta_variant() {
        let version = sample_version("case-9", 1, sample_result(CaseMomentum::StrongExpertPending));
        let row = AnalysisVersionRow::from_domain(&version).unwrap();

        assert_eq!(row.momentum, "STRONG_EXPERT_PENDING");
        assert_eq!(row.analysis_delta["kind"], "first_analysis");
        assert_eq!(row.into_domain().unwrap(), version);
    }

    #[test]
    fn test_unknown_momentum_is_rejected() {
        let row = AnalysisVersionSummaryRow {
            case_id: "case-9".to_string(),
            version_number: 1,
            momentum: "VERY_STRONG".to_string(),
            document_count: 2,
            created_at: Utc::now(),
        };
        assert!(row.into_domain().is_err());
    }
}
