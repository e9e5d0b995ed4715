use crate::errors::TrackerError;
use crate::models::{Confirmation, HistoryEntry, Notification, NotificationKind, TrackerState};
use chrono::{DateTime, Utc};
use std::num::NonZeroI64;
use tracing::{debug, warn};

/// Reads an optional sign and the run of ASCII digits that follows it,
/// ignoring whatever comes after. `"42abc"` and `"12.5"` yield 42 and 12.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude = rest[..digits_end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

impl TrackerState {
    pub fn set_goal(&mut self, raw: &str) -> Result<Notification, TrackerError> {
        let goal = match parse_leading_int(raw) {
            Some(value) if value > 0 => value,
            _ => {
                return Err(TrackerError::InvalidGoal {
                    input: raw.to_string(),
                });
            }
        };

        self.goal = goal;
        debug!(goal, "goal updated");
        Ok(Notification::new(NotificationKind::Success, "Goal updated!"))
    }

    pub fn add_score(&mut self, delta: NonZeroI64, now: DateTime<Utc>) -> Notification {
        let delta = delta.get();
        let score_before = self.current_score;
        let Some(score_after) = score_before.checked_add(delta) else {
            warn!(delta, score = score_before, "score change would overflow, ignoring");
            return Notification::new(NotificationKind::Error, "Score limit reached!");
        };
        self.current_score = score_after;

        if delta > 0 {
            self.wins = self.wins.saturating_add(1);
        } else {
            self.losses = self.losses.saturating_add(1);
        }

        // history is unbounded; entries only ever go in at the front
        self.history.insert(
            0,
            HistoryEntry {
                delta,
                recorded_at: now,
                score_before,
                score_after: self.current_score,
            },
        );
        debug!(delta, score = self.current_score, "score recorded");

        if delta > 0 {
            Notification::new(NotificationKind::Success, format!("+{delta} pts added!"))
        } else {
            Notification::new(NotificationKind::Warning, format!("{delta} pts subtracted!"))
        }
    }

    /// Resets score, counters and history. The goal survives.
    pub fn clear_all(&mut self, confirmation: Confirmation) -> Option<Notification> {
        if confirmation != Confirmation::Confirmed {
            debug!("clear declined");
            return None;
        }

        self.history.clear();
        self.current_score = 0;
        self.wins = 0;
        self.losses = 0;
        debug!("tracker cleared");
        Some(Notification::new(
            NotificationKind::Info,
            "Everything cleared! Score and counters reset.",
        ))
    }
}
