//! Case corpus aggregation
//!
//! Collects every text fragment of a case into one string for pattern scoring.
//! A source that cannot be read is logged and left out; the rest of the corpus
//! is still built.

use std::collections::HashSet;

use crate::db::{CaseSources, DbError};
use crate::model::{
    AnalysisSettings, BundleChunk, CaseDocument, CaseNote, DraftLetter, ExtractedFacts, KeyIssue,
    TimelineEntry, TimelineEvent,
};

/// Raw records of one case, as read from the sources
#[derive(Debug, Clone, Default)]
pub struct CaseRecords {
    pub documents: Vec<CaseDocument>,
    pub bundle_chunks: Vec<BundleChunk>,
    pub timeline_events: Vec<TimelineEvent>,
    pub notes: Vec<CaseNote>,
    pub letters: Vec<DraftLetter>,
    /// Names of the sources that failed to load
    pub failed_sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseCorpus {
    pub text: String,
    pub document_ids: Vec<String>,
    pub document_names: Vec<String>,
    pub key_issues: Vec<KeyIssue>,
    pub timeline: Vec<TimelineEntry>,
    pub failed_sources: Vec<String>,
}

fn tolerate<T>(
    case_id: &str,
    source: &str,
    result: Result<Vec<T>, DbError>,
    failed: &mut Vec<String>,
) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                case_id = %case_id,
                source = source,
                error = %e,
                "Failed to read case source, continuing without it"
            );
            failed.push(source.to_string());
            Vec::new()
        }
    }
}

/// Read all five source kinds concurrently
pub async fn load_records(sources: &dyn CaseSources, case_id: &str) -> CaseRecords {
    let (documents, bundle_chunks, timeline_events, notes, letters) = futures::join!(
        sources.list_documents(case_id),
        sources.list_bundle_chunks(case_id),
        sources.list_timeline_events(case_id),
        sources.list_case_notes(case_id),
        sources.list_letters(case_id),
    );

    let mut failed = Vec::new();
    CaseRecords {
        documents: tolerate(case_id, "documents", documents, &mut failed),
        bundle_chunks: tolerate(case_id, "bundle_chunks", bundle_chunks, &mut failed),
        timeline_events: tolerate(case_id, "timeline_events", timeline_events, &mut failed),
        notes: tolerate(case_id, "case_notes", notes, &mut failed),
        letters: tolerate(case_id, "letters", letters, &mut failed),
        failed_sources: failed,
    }
}

/// Lower-case slug used as the id of a key issue without one
pub fn slug(label: &str) -> String {
    label
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn joined<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.map(str::trim).filter(|t| !t.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Fragments of one document, in fixed order
fn document_fragments(document: &CaseDocument, min_summary_chars: usize) -> Vec<String> {
    let mut fragments = Vec::new();

    if let Some(summary) = document.ai_summary.as_deref() {
        if summary.trim().chars().count() > min_summary_chars {
            fragments.push(summary.trim().to_string());
        }
    }

    if let Some(payload) = &document.extracted_facts {
        let facts = ExtractedFacts::from_value(payload);
        if let Some(summary) = facts.summary {
            fragments.push(summary);
        }
        fragments.push(joined(facts.key_issues.iter().filter_map(|i| i.text())));
        fragments.push(joined(facts.timeline.iter().filter_map(|i| i.text())));

        if !payload.is_null() {
            fragments.push(payload.to_string());
        }
    }

    fragments
}

fn key_issues(documents: &[CaseDocument]) -> Vec<KeyIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    for payload in documents.iter().filter_map(|d| d.extracted_facts.as_ref()) {
        for item in ExtractedFacts::from_value(payload).key_issues {
            let Some(label) = item.text().map(|t| t.trim().to_string()) else {
                continue;
            };
            let id = item
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| slug(&label));
            if id.is_empty() || !seen.insert(id.clone()) {
                continue;
            }
            issues.push(KeyIssue { id, label });
        }
    }

    issues
}

/// Assemble the corpus from records already loaded
pub fn assemble(records: &CaseRecords, settings: &AnalysisSettings) -> CaseCorpus {
    let mut fragments: Vec<String> = records
        .documents
        .iter()
        .flat_map(|d| document_fragments(d, settings.min_summary_chars))
        .collect();

    for chunk in &records.bundle_chunks {
        fragments.extend(chunk.raw_text.iter().cloned());
        fragments.extend(chunk.ai_summary.iter().cloned());
    }
    fragments.extend(records.timeline_events.iter().map(|e| e.description.clone()));

    let text = joined(fragments.iter().map(String::as_str));

    let mut events: Vec<&TimelineEvent> = records.timeline_events.iter().collect();
    events.sort_by_key(|e| e.date);
    let timeline = events
        .into_iter()
        .map(|e| TimelineEntry {
            date: e.date,
            description: e.description.clone(),
        })
        .collect();

    CaseCorpus {
        text,
        document_ids: records.documents.iter().map(|d| d.id.clone()).collect(),
        document_names: records.documents.iter().map(|d| d.name.clone()).collect(),
        key_issues: key_issues(&records.documents),
        timeline,
        failed_sources: records.failed_sources.clone(),
    }
}

/// Load the sources of `case_id` and assemble its corpus
pub async fn build_corpus(
    sources: &dyn CaseSources,
    case_id: &str,
    settings: &AnalysisSettings,
) -> CaseCorpus {
    let records = load_records(sources, case_id).await;
    let corpus = assemble(&records, settings);

    tracing::debug!(
        case_id = %case_id,
        chars = corpus.text.chars().count(),
        documents = corpus.document_ids.len(),
        failed = corpus.failed_sources.len(),
        "Built case corpus"
    );

    corpus
}
