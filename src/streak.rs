use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

/// Consecutive completed days ending at `today`, walking backwards until the
/// first gap. Zero when today itself is not completed.
pub fn current_streak_at(completed_dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let done: HashSet<NaiveDate> = completed_dates.iter().copied().collect();

    let mut streak = 0;
    let mut day = today;
    while done.contains(&day) {
        streak += 1;
        day = day - Duration::days(1);
    }
    streak
}
