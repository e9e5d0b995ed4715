use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GOAL: i64 = 100;

/// Everything the tracker persists as one snapshot under the store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerState {
    pub current_score: i64,
    pub goal: i64,
    /// Most recent entry first.
    pub history: Vec<HistoryEntry>,
    pub wins: u64,
    pub losses: u64,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            current_score: 0,
            goal: DEFAULT_GOAL,
            history: Vec::new(),
            wins: 0,
            losses: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(alias = "points")]
    pub delta: i64,
    #[serde(alias = "timestamp")]
    pub recorded_at: DateTime<Utc>,
    #[serde(alias = "oldScore")]
    pub score_before: i64,
    #[serde(alias = "newScore")]
    pub score_after: i64,
}

impl HistoryEntry {
    pub fn is_win(&self) -> bool {
        self.delta > 0
    }

    /// Non-zero delta that carries `score_before` exactly to `score_after`.
    pub fn is_consistent(&self) -> bool {
        self.delta != 0 && self.score_before.checked_add(self.delta) == Some(self.score_after)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressTier {
    Low,
    Medium,
    High,
    Complete,
}

impl ProgressTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressTier::Low => "low",
            ProgressTier::Medium => "medium",
            ProgressTier::High => "high",
            ProgressTier::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub current_score: i64,
    pub goal: i64,
    pub remaining: i64,
    pub wins: u64,
    pub losses: u64,
    pub progress_ratio: f64,
    pub progress_percent: i64,
    pub progress_tier: ProgressTier,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient message for the user; never part of the persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItemView {
    pub delta: i64,
    pub recorded_at: DateTime<Utc>,
    pub score_before: i64,
    pub score_after: i64,
    pub relative_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackerResponse {
    pub current_score: i64,
    pub goal: i64,
    pub remaining: i64,
    pub wins: u64,
    pub losses: u64,
    pub progress_percent: i64,
    pub progress_tier: ProgressTier,
    pub history: Vec<HistoryItemView>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notification: Option<Notification>,
}
