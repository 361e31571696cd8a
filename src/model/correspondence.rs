use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Letter,
    Phone,
    Meeting,
    Document,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Client,
    Opponent,
    Court,
    Internal,
    Unknown,
}

/// Where a correspondence item was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CorrespondenceSource {
    Note,
    Document,
    Letter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CorrespondenceItem {
    pub id: String,
    pub source: CorrespondenceSource,
    pub direction: Direction,
    pub channel: Channel,
    pub party: Party,
    pub subject_or_label: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    /// Whole calendar days since the previous item; `None` for the first item
    pub gap_since_previous_days: Option<i64>,
    pub is_opponent_reply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LongGap {
    pub from_id: String,
    pub to_id: String,
    pub days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpponentActivityStatus {
    Normal,
    SlowerThanUsual,
    ConcerningSilence,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OpponentActivity {
    pub status: OpponentActivityStatus,
    /// Days since the latest outbound item to the opponent, if it is still unanswered
    pub days_waiting: Option<i64>,
    pub average_reply_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CorrespondenceTimeline {
    pub items: Vec<CorrespondenceItem>,
    pub long_gaps: Vec<LongGap>,
    /// Undefined (not zero) when no valid outbound/reply pair exists
    pub opponent_avg_reply_days: Option<f64>,
    pub opponent_activity: OpponentActivity,
}
