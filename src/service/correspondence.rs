//! Correspondence timeline
//!
//! Merges case notes, correspondence-like documents and drafted letters into one
//! chronological feed, collapses duplicates, and derives how responsive the other
//! side has been.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{
    AnalysisSettings, CaseDocument, CaseNote, Channel, CorrespondenceItem, CorrespondenceSource,
    CorrespondenceTimeline, Direction, DraftLetter, LongGap, OpponentActivity,
    OpponentActivityStatus, Party,
};
use crate::service::fingerprint::correspondence_key;

/// Characters kept when a label is cut from a free-text body
const LABEL_CHARS: usize = 100;

const INBOUND_TERMS: &[&str] = &[
    "email from",
    "letter from",
    "call from",
    "received from",
    "response from",
    "reply from",
];
const OUTBOUND_TERMS: &[&str] = &[
    "email to",
    "letter to",
    "call to",
    "sent to",
    "wrote to",
    "chased",
];

/// Phrases naming the client as the other end of a note or document. The bare
/// word is too common in the other side's letters ("your client").
const CLIENT_PHRASES: &[&str] = &[
    "from client",
    "to client",
    "with client",
    "from the client",
    "to the client",
    "with the client",
    "client called",
    "client emailed",
];
/// Addressee text of a drafted letter names the recipient directly
const CLIENT_RECIPIENT_TERMS: &[&str] = &["client"];
const OPPONENT_TERMS: &[&str] = &[
    "defendant",
    "opponent",
    "other side",
    "insurer",
    "nhs resolution",
    "trust",
    "third party",
];
const COURT_TERMS: &[&str] = &["court", "tribunal", "judge"];

const CORRESPONDENCE_DOC_TERMS: &[&str] = &[
    "letter",
    "email",
    "correspondence",
    "response",
    "reply",
];
const OUTBOUND_DOC_TERMS: &[&str] = &["our letter", "letter to", "email to", "outgoing"];

/// Thresholds of the timeline pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSettings {
    pub long_gap_days: i64,
    pub max_reply_days: i64,
    pub concerning_multiplier: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self::from_settings(&AnalysisSettings::default())
    }
}

impl TimelineSettings {
    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self {
            long_gap_days: settings.long_gap_days,
            max_reply_days: settings.max_reply_days,
            concerning_multiplier: settings.concerning_multiplier,
        }
    }
}

fn any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Opponent terms win over client terms when both appear.
fn party_of(text: &str, client_terms: &[&str]) -> Party {
    if any(text, OPPONENT_TERMS) {
        Party::Opponent
    } else if any(text, client_terms) {
        Party::Client
    } else if any(text, COURT_TERMS) {
        Party::Court
    } else {
        Party::Unknown
    }
}

fn channel_of(text: &str, fallback: Channel) -> Channel {
    if text.contains("email") {
        Channel::Email
    } else if text.contains("phone") || text.contains("call") {
        Channel::Phone
    } else if text.contains("letter") {
        Channel::Letter
    } else if text.contains("meeting") {
        Channel::Meeting
    } else {
        fallback
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .chars()
        .take(LABEL_CHARS)
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn item(
    id: &str,
    source: CorrespondenceSource,
    direction: Direction,
    channel: Channel,
    party: Party,
    subject_or_label: String,
    summary: String,
    created_at: DateTime<Utc>,
) -> CorrespondenceItem {
    CorrespondenceItem {
        id: id.to_string(),
        source,
        direction,
        channel,
        party,
        subject_or_label,
        summary,
        created_at,
        gap_since_previous_days: None,
        is_opponent_reply: direction == Direction::Inbound && party == Party::Opponent,
    }
}

/// A free-text case note. Inbound phrasing is checked before outbound.
pub fn from_note(note: &CaseNote) -> CorrespondenceItem {
    let text = note.body.to_lowercase();

    let direction = if any(&text, INBOUND_TERMS) {
        Direction::Inbound
    } else if any(&text, OUTBOUND_TERMS) {
        Direction::Outbound
    } else {
        Direction::Internal
    };
    let party = match direction {
        Direction::Internal => Party::Internal,
        _ => party_of(&text, CLIENT_PHRASES),
    };

    item(
        &note.id,
        CorrespondenceSource::Note,
        direction,
        channel_of(&text, Channel::Note),
        party,
        first_line(&note.body),
        note.body.trim().to_string(),
        note.created_at,
    )
}

/// A named case document, when its name or type reads like correspondence
pub fn from_document(document: &CaseDocument) -> Option<CorrespondenceItem> {
    let text = format!(
        "{} {}",
        document.name,
        document.doc_type.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    if !any(&text, CORRESPONDENCE_DOC_TERMS) {
        return None;
    }

    let direction = if any(&text, OUTBOUND_DOC_TERMS) {
        Direction::Outbound
    } else {
        Direction::Inbound
    };

    Some(item(
        &document.id,
        CorrespondenceSource::Document,
        direction,
        channel_of(&text, Channel::Document),
        party_of(&text, CLIENT_PHRASES),
        document.name.clone(),
        document.ai_summary.clone().unwrap_or_default(),
        document.created_at,
    ))
}

/// A drafted letter; always outbound
pub fn from_letter(letter: &DraftLetter) -> CorrespondenceItem {
    let addressed = format!(
        "{} {}",
        letter.recipient.as_deref().unwrap_or_default(),
        letter.template.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    let label = letter
        .subject
        .clone()
        .or_else(|| letter.template.clone())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "Letter".to_string());

    item(
        &letter.id,
        CorrespondenceSource::Letter,
        Direction::Outbound,
        Channel::Letter,
        party_of(&addressed, CLIENT_RECIPIENT_TERMS),
        label,
        letter.body.clone().unwrap_or_default(),
        letter.created_at,
    )
}

/// Collapse items sharing a day and normalized label.
///
/// On a collision the record with the longer summary wins; on equal length
/// the later record wins. Output keeps first-seen order.
pub fn dedup(items: Vec<CorrespondenceItem>) -> Vec<CorrespondenceItem> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<CorrespondenceItem> = Vec::with_capacity(items.len());

    for candidate in items {
        let key = correspondence_key(candidate.created_at.date_naive(), &candidate.subject_or_label);
        match index.get(&key) {
            Some(&at) => {
                if candidate.summary.chars().count() >= kept[at].summary.chars().count() {
                    kept[at] = candidate;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(candidate);
            }
        }
    }

    kept
}

fn day_gap(earlier: &DateTime<Utc>, later: &DateTime<Utc>) -> i64 {
    (later.date_naive() - earlier.date_naive()).num_days()
}

/// Sort by timestamp and annotate each item with the gap to the one before it
fn sort_and_annotate(mut items: Vec<CorrespondenceItem>) -> Vec<CorrespondenceItem> {
    items.sort_by_key(|i| i.created_at);

    let mut previous: Option<DateTime<Utc>> = None;
    for current in items.iter_mut() {
        current.gap_since_previous_days = previous.map(|p| day_gap(&p, &current.created_at));
        previous = Some(current.created_at);
    }
    items
}

pub fn long_gaps(items: &[CorrespondenceItem], long_gap_days: i64) -> Vec<LongGap> {
    items
        .windows(2)
        .filter_map(|pair| {
            let days = pair[1].gap_since_previous_days?;
            (days >= long_gap_days).then(|| LongGap {
                from_id: pair[0].id.clone(),
                to_id: pair[1].id.clone(),
                days,
            })
        })
        .collect()
}

fn is_outbound_to_opponent(item: &CorrespondenceItem) -> bool {
    item.direction == Direction::Outbound && item.party == Party::Opponent
}

/// Mean days between an outbound-to-opponent item and the next opponent reply.
///
/// `items` must be sorted. Pairs of zero days or less, or of `max_reply_days`
/// or more, are discarded. `None` when no pair survives.
pub fn opponent_avg_reply_days(items: &[CorrespondenceItem], max_reply_days: i64) -> Option<f64> {
    let gaps: Vec<i64> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| is_outbound_to_opponent(item))
        .filter_map(|(at, sent)| {
            let reply = items[at + 1..].iter().find(|i| i.is_opponent_reply)?;
            Some(day_gap(&sent.created_at, &reply.created_at))
        })
        .filter(|gap| *gap > 0 && *gap < max_reply_days)
        .collect();

    if gaps.is_empty() {
        return None;
    }
    Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
}

/// Current responsiveness of the other side, measured at `now`
pub fn opponent_activity(
    items: &[CorrespondenceItem],
    average_reply_days: Option<f64>,
    now: DateTime<Utc>,
    multiplier: f64,
) -> OpponentActivity {
    let last_reply = items.iter().rposition(|i| i.is_opponent_reply);
    let days_waiting = items
        .iter()
        .rposition(is_outbound_to_opponent)
        .filter(|&sent| last_reply.is_none_or(|reply| reply < sent))
        .map(|sent| day_gap(&items[sent].created_at, &now).max(0));

    let status = match (average_reply_days, days_waiting) {
        (None, _) => OpponentActivityStatus::NoData,
        (Some(_), None) => OpponentActivityStatus::Normal,
        (Some(avg), Some(waiting)) => {
            let waiting = waiting as f64;
            if waiting > avg * multiplier {
                OpponentActivityStatus::ConcerningSilence
            } else if waiting > avg {
                OpponentActivityStatus::SlowerThanUsual
            } else {
                OpponentActivityStatus::Normal
            }
        }
    };

    OpponentActivity {
        status,
        days_waiting,
        average_reply_days,
    }
}

/// Build the full timeline for one case
pub fn build_timeline(
    notes: &[CaseNote],
    documents: &[CaseDocument],
    letters: &[DraftLetter],
    now: DateTime<Utc>,
    settings: &TimelineSettings,
) -> CorrespondenceTimeline {
    let raw: Vec<CorrespondenceItem> = notes
        .iter()
        .map(from_note)
        .chain(documents.iter().filter_map(from_document))
        .chain(letters.iter().map(from_letter))
        .collect();
    let raw_count = raw.len();

    let items = sort_and_annotate(dedup(raw));
    let long_gaps = long_gaps(&items, settings.long_gap_days);
    let average = opponent_avg_reply_days(&items, settings.max_reply_days);
    let activity = opponent_activity(&items, average, now, settings.concerning_multiplier);

    tracing::debug!(
        raw = raw_count,
        items = items.len(),
        long_gaps = long_gaps.len(),
        average_reply_days = ?average,
        status = ?activity.status,
        "Built correspondence timeline"
    );

    CorrespondenceTimeline {
        items,
        long_gaps,
        opponent_avg_reply_days: average,
        opponent_activity: activity,
    }
}
