use crate::errors::HabitError;
use crate::models::Habit;
use crate::schedule::can_mark_on;
use chrono::NaiveDate;
use std::cmp::Reverse;

pub const MARK_COMPLETE: &str = "Mark complete";
pub const COMPLETED: &str = "Completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Today was added to the completion history.
    MarkedComplete,
    /// Today was already completed; only the button label flipped back.
    LabelToggled,
}

impl ToggleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ToggleOutcome::MarkedComplete => "marked_complete",
            ToggleOutcome::LabelToggled => "label_toggled",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ToggleOutcome::MarkedComplete => "Nice! Habit marked complete for today.",
            ToggleOutcome::LabelToggled => {
                "Button toggled to 'Mark complete' (calendar remains green)."
            }
        }
    }
}

/// Records today's completion, or on a repeat click sets the per-day label
/// override. Completion history is never shrunk here.
pub fn toggle_completion(habit: &mut Habit, today: NaiveDate) -> Result<ToggleOutcome, HabitError> {
    if !can_mark_on(habit, today) {
        return Err(HabitError::NotScheduled { date: today });
    }

    if habit.is_completed_on(today) {
        habit.label_override_date = Some(today);
        return Ok(ToggleOutcome::LabelToggled);
    }

    habit.completed_dates.push(today);
    habit.completed_dates.sort_unstable_by_key(|date| Reverse(*date));
    habit.completed_dates.dedup();
    if habit.label_override_date == Some(today) {
        habit.label_override_date = None;
    }
    Ok(ToggleOutcome::MarkedComplete)
}

pub fn button_label(habit: &Habit, today: NaiveDate) -> &'static str {
    if habit.label_override_date == Some(today) {
        MARK_COMPLETE
    } else if habit.is_completed_on(today) {
        COMPLETED
    } else {
        MARK_COMPLETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayName, Frequency};
    use chrono::{Duration, Local};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(frequency: Frequency, days: &[DayName]) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: "Stretch".into(),
            description: None,
            frequency,
            selected_days: days.iter().copied().collect(),
            created_at: Local::now().fixed_offset(),
            completed_dates: Vec::new(),
            label_override_date: None,
        }
    }

    #[test]
    fn first_toggle_marks_today_complete() {
        let today = date(2024, 3, 3);
        let mut h = habit(Frequency::Daily, &[]);
        h.completed_dates = vec![date(2024, 3, 1), date(2024, 3, 2)];

        let outcome = toggle_completion(&mut h, today).unwrap();
        assert_eq!(outcome, ToggleOutcome::MarkedComplete);
        assert_eq!(
            h.completed_dates,
            vec![date(2024, 3, 3), date(2024, 3, 2), date(2024, 3, 1)]
        );
        assert_eq!(button_label(&h, today), COMPLETED);
    }

    #[test]
    fn second_toggle_only_sets_label_override() {
        let today = date(2024, 3, 3);
        let mut h = habit(Frequency::Daily, &[]);
        toggle_completion(&mut h, today).unwrap();
        let size = h.completed_dates.len();

        let outcome = toggle_completion(&mut h, today).unwrap();
        assert_eq!(outcome, ToggleOutcome::LabelToggled);
        assert_eq!(h.completed_dates.len(), size);
        assert_eq!(h.label_override_date, Some(today));
        assert_eq!(button_label(&h, today), MARK_COMPLETE);

        toggle_completion(&mut h, today).unwrap();
        assert_eq!(h.completed_dates.len(), size);
    }

    #[test]
    fn stale_override_is_ignored_next_day() {
        let today = date(2024, 3, 3);
        let mut h = habit(Frequency::Daily, &[]);
        h.completed_dates = vec![today];
        h.label_override_date = Some(today - Duration::days(1));
        assert_eq!(button_label(&h, today), COMPLETED);
    }

    #[test]
    fn fresh_completion_clears_same_day_override() {
        let today = date(2024, 3, 3);
        let mut h = habit(Frequency::Daily, &[]);
        h.label_override_date = Some(today);
        toggle_completion(&mut h, today).unwrap();
        assert!(h.label_override_date.is_none());

        let yesterday = today - Duration::days(1);
        h.label_override_date = Some(yesterday);
        let tomorrow = today + Duration::days(1);
        toggle_completion(&mut h, tomorrow).unwrap();
        assert_eq!(h.label_override_date, Some(yesterday));
    }

    #[test]
    fn duplicate_history_entries_never_appear() {
        let today = date(2024, 3, 3);
        let mut h = habit(Frequency::Daily, &[]);
        h.completed_dates = vec![date(2024, 3, 2)];
        for day in [today, today, date(2024, 3, 4), today] {
            let _ = toggle_completion(&mut h, day);
        }
        let mut sorted = h.completed_dates.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), h.completed_dates.len());
        assert_eq!(h.completed_dates.len(), 3);
    }

    #[test]
    fn ineligible_day_is_rejected_without_changes() {
        let thursday = date(2024, 1, 18);
        let mut h = habit(Frequency::Weekly, &[DayName::Wednesday]);
        let before = h.clone();
        let err = toggle_completion(&mut h, thursday).unwrap_err();
        assert!(matches!(err, HabitError::NotScheduled { date } if date == thursday));
        assert_eq!(h, before);
    }
}
