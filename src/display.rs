use crate::models::{DisplaySnapshot, HistoryEntry, HistoryItemView, ProgressTier, TrackerState};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 60 * MINUTE_SECS;
const DAY_SECS: i64 = 24 * HOUR_SECS;

pub fn compute_display_snapshot(state: &TrackerState) -> DisplaySnapshot {
    // goal is validated positive on every write path, so the division is safe
    let progress_ratio = (state.current_score as f64 / state.goal as f64).min(1.0);

    DisplaySnapshot {
        current_score: state.current_score,
        goal: state.goal,
        remaining: state.goal.saturating_sub(state.current_score).max(0),
        wins: state.wins,
        losses: state.losses,
        progress_ratio,
        progress_percent: round_half_up(progress_ratio * 100.0),
        progress_tier: progress_tier(progress_ratio),
        history: state.history.clone(),
    }
}

pub fn progress_tier(ratio: f64) -> ProgressTier {
    if ratio >= 1.0 {
        ProgressTier::Complete
    } else if ratio >= 0.7 {
        ProgressTier::High
    } else if ratio >= 0.4 {
        ProgressTier::Medium
    } else {
        ProgressTier::Low
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Labels `recorded_at` relative to `now`; past a day it falls back to an
/// absolute date in `now`'s time zone.
pub fn format_relative_time_at<Tz>(now: &DateTime<Tz>, recorded_at: &DateTime<Utc>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let elapsed = (now.with_timezone(&Utc) - *recorded_at).num_seconds();

    if elapsed < MINUTE_SECS {
        "just now".to_string()
    } else if elapsed < HOUR_SECS {
        format!("{} min ago", elapsed / MINUTE_SECS)
    } else if elapsed < DAY_SECS {
        format!("{} h ago", elapsed / HOUR_SECS)
    } else {
        recorded_at
            .with_timezone(&now.timezone())
            .format("%d.%m, %H:%M")
            .to_string()
    }
}

pub fn history_views(history: &[HistoryEntry]) -> Vec<HistoryItemView> {
    history_views_at(history, &Local::now())
}

pub fn history_views_at<Tz>(history: &[HistoryEntry], now: &DateTime<Tz>) -> Vec<HistoryItemView>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    history
        .iter()
        .map(|entry| HistoryItemView {
            delta: entry.delta,
            recorded_at: entry.recorded_at,
            score_before: entry.score_before,
            score_after: entry.score_after,
            relative_time: format_relative_time_at(now, &entry.recorded_at),
        })
        .collect()
}
