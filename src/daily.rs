use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::profile::Profile;

/// One attempt per calendar date.
pub fn is_eligible(profile: &Profile, today: NaiveDate) -> bool {
    profile.daily.last_played != Some(today)
}

/// Streak after a win on `today`: continues only from a win yesterday.
pub fn next_streak(current: u32, last_win: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match (last_win, today.pred_opt()) {
        (Some(last), Some(yesterday)) if last == yesterday => current + 1,
        _ => 1,
    }
}

/// Time left until the next local midnight.
pub fn time_until_next(now: NaiveDateTime) -> Duration {
    let tomorrow = now
        .date()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now);
    (tomorrow - now).max(Duration::zero())
}

pub fn countdown_label(now: NaiveDateTime) -> String {
    let left = time_until_next(now);
    if left <= Duration::zero() {
        return "New Challenge!".to_string();
    }
    let secs = left.num_seconds();
    format!(
        "Next in: {}h {}m {}s",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
