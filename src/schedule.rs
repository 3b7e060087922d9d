use crate::models::{DayCell, DayName, DayStatus, Frequency, Habit};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

pub const WINDOW_LEN: usize = 7;

/// The seven calendar days shown for a habit, starting at `anchor`.
///
/// Daily habits get seven consecutive days. Weekly and custom habits get the
/// next seven dates falling on one of `selected_days`; with no days selected
/// they fall back to consecutive days as well.
pub fn occurrence_window(
    anchor: NaiveDate,
    frequency: Frequency,
    selected_days: &BTreeSet<DayName>,
) -> Vec<DayCell> {
    let consecutive = frequency == Frequency::Daily || selected_days.is_empty();

    let mut cells = Vec::with_capacity(WINDOW_LEN);
    let mut current = anchor;
    while cells.len() < WINDOW_LEN {
        let weekday = DayName::of(current);
        if consecutive || selected_days.contains(&weekday) {
            cells.push(DayCell {
                iso_date: current,
                day_of_month: current.day(),
                weekday,
            });
        }
        current = current + Duration::days(1);
    }
    cells
}

pub fn habit_window(habit: &Habit) -> Vec<DayCell> {
    occurrence_window(habit.anchor_date(), habit.frequency, &habit.selected_days)
}

pub fn classify_day(cell: &DayCell, habit: &Habit, today: NaiveDate) -> DayStatus {
    if habit.is_completed_on(cell.iso_date) {
        return DayStatus::Completed;
    }
    if cell.iso_date >= today {
        return DayStatus::Neutral;
    }
    match habit.frequency {
        Frequency::Daily => DayStatus::Missed,
        // A past scheduled day left undone stays neutral for weekly/custom habits.
        Frequency::Weekly | Frequency::Custom => {
            if habit.selected_days.contains(&cell.weekday) {
                DayStatus::Neutral
            } else {
                DayStatus::Missed
            }
        }
    }
}

pub fn classify_window(cells: &[DayCell], habit: &Habit, today: NaiveDate) -> Vec<DayStatus> {
    cells
        .iter()
        .map(|cell| classify_day(cell, habit, today))
        .collect()
}

/// Whether `date` is a day the habit may be marked complete on.
pub fn can_mark_on(habit: &Habit, date: NaiveDate) -> bool {
    match habit.frequency {
        Frequency::Daily => true,
        Frequency::Weekly | Frequency::Custom => habit.selected_days.contains(&DayName::of(date)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(frequency: Frequency, days: &[DayName], created: NaiveDate) -> Habit {
        let created_at = FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&created.and_hms_opt(9, 0, 0).unwrap())
            .unwrap();
        Habit {
            id: Uuid::new_v4(),
            name: "habit".into(),
            description: None,
            frequency,
            selected_days: days.iter().copied().collect(),
            created_at,
            completed_dates: Vec::new(),
            label_override_date: None,
        }
    }

    #[test]
    fn daily_window_is_seven_consecutive_days() {
        let anchor = date(2024, 3, 1);
        let cells = occurrence_window(anchor, Frequency::Daily, &BTreeSet::new());
        let dates: Vec<_> = cells.iter().map(|cell| cell.iso_date).collect();
        let expected: Vec<_> = (0..7).map(|i| anchor + Duration::days(i)).collect();
        assert_eq!(dates, expected);
        assert_eq!(cells[0].day_of_month, 1);
        assert_eq!(cells[0].weekday, DayName::Friday);
    }

    #[test]
    fn daily_window_ignores_selected_days() {
        let days: BTreeSet<_> = [DayName::Monday].into_iter().collect();
        let cells = occurrence_window(date(2024, 3, 1), Frequency::Daily, &days);
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[6].iso_date, date(2024, 3, 7));
    }

    #[test]
    fn weekly_window_collects_next_seven_wednesdays() {
        let days: BTreeSet<_> = [DayName::Wednesday].into_iter().collect();
        let cells = occurrence_window(date(2024, 1, 1), Frequency::Weekly, &days);
        let dates: Vec<_> = cells.iter().map(|cell| cell.iso_date).collect();
        let expected: Vec<_> = (0..7).map(|i| date(2024, 1, 3) + Duration::weeks(i)).collect();
        assert_eq!(dates, expected);
        assert!(cells.iter().all(|cell| cell.weekday == DayName::Wednesday));
    }

    #[test]
    fn custom_window_only_contains_selected_days_in_order() {
        let days: BTreeSet<_> = [DayName::Tuesday, DayName::Saturday, DayName::Sunday]
            .into_iter()
            .collect();
        let cells = occurrence_window(date(2024, 2, 27), Frequency::Custom, &days);
        assert_eq!(cells.len(), 7);
        assert!(cells.iter().all(|cell| days.contains(&cell.weekday)));
        assert!(cells.windows(2).all(|pair| pair[0].iso_date < pair[1].iso_date));
        // Crosses the leap day into March.
        assert_eq!(cells[0].iso_date, date(2024, 2, 27));
        assert_eq!(cells[1].iso_date, date(2024, 3, 2));
    }

    #[test]
    fn empty_selection_falls_back_to_consecutive_days() {
        let cells = occurrence_window(date(2024, 1, 1), Frequency::Custom, &BTreeSet::new());
        assert_eq!(cells.first().unwrap().iso_date, date(2024, 1, 1));
        assert_eq!(cells.last().unwrap().iso_date, date(2024, 1, 7));
    }

    #[test]
    fn daily_past_days_without_completion_are_missed() {
        let mut h = habit(Frequency::Daily, &[], date(2024, 3, 1));
        h.completed_dates = vec![date(2024, 3, 2)];
        let today = date(2024, 3, 4);
        let statuses = classify_window(&habit_window(&h), &h, today);
        assert_eq!(
            statuses,
            vec![
                DayStatus::Missed,
                DayStatus::Completed,
                DayStatus::Missed,
                DayStatus::Neutral,
                DayStatus::Neutral,
                DayStatus::Neutral,
                DayStatus::Neutral,
            ]
        );
    }

    #[test]
    fn weekly_past_scheduled_day_stays_neutral() {
        let h = habit(Frequency::Weekly, &[DayName::Wednesday], date(2024, 1, 1));
        let today = date(2024, 1, 17);
        let cells = habit_window(&h);
        assert_eq!(classify_day(&cells[0], &h, today), DayStatus::Neutral);
        assert_eq!(classify_day(&cells[2], &h, today), DayStatus::Neutral);
    }

    #[test]
    fn weekly_past_unscheduled_day_is_missed() {
        // Window built with other days than the habit now selects, as after an edit.
        let h = habit(Frequency::Weekly, &[DayName::Wednesday], date(2024, 1, 1));
        let cell = DayCell {
            iso_date: date(2024, 1, 2),
            day_of_month: 2,
            weekday: DayName::Tuesday,
        };
        assert_eq!(classify_day(&cell, &h, date(2024, 1, 10)), DayStatus::Missed);
        assert_eq!(classify_day(&cell, &h, date(2024, 1, 2)), DayStatus::Neutral);
    }

    #[test]
    fn completed_wins_over_every_other_status() {
        let mut h = habit(Frequency::Daily, &[], date(2024, 3, 1));
        h.completed_dates = vec![date(2024, 3, 5)];
        let cell = DayCell {
            iso_date: date(2024, 3, 5),
            day_of_month: 5,
            weekday: DayName::Tuesday,
        };
        assert_eq!(classify_day(&cell, &h, date(2024, 3, 1)), DayStatus::Completed);
    }

    #[test]
    fn eligibility_follows_frequency() {
        let wednesday = date(2024, 1, 17);
        let thursday = date(2024, 1, 18);
        let daily = habit(Frequency::Daily, &[], date(2024, 1, 1));
        let weekly = habit(Frequency::Weekly, &[DayName::Wednesday], date(2024, 1, 1));
        let custom = habit(Frequency::Custom, &[], date(2024, 1, 1));
        assert!(can_mark_on(&daily, thursday));
        assert!(can_mark_on(&weekly, wednesday));
        assert!(!can_mark_on(&weekly, thursday));
        assert!(!can_mark_on(&custom, wednesday));
    }
}
