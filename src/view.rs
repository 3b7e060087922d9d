use crate::completion::button_label;
use crate::models::{AppData, DayView, Frequency, Habit, HabitView};
use crate::schedule::{can_mark_on, classify_day, habit_window};
use crate::streak::current_streak_at;
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Reverse;

pub fn build_view_at(habit: &Habit, today: NaiveDate) -> HabitView {
    let days = habit_window(habit)
        .into_iter()
        .map(|cell| DayView {
            status: classify_day(&cell, habit, today),
            short_label: cell.weekday.short_label(),
            iso_date: cell.iso_date,
            day_of_month: cell.day_of_month,
            weekday: cell.weekday,
        })
        .collect();

    HabitView {
        id: habit.id,
        name: habit.name.clone(),
        description: habit.description.clone(),
        frequency: habit.frequency,
        selected_days: habit.selected_days.iter().copied().collect(),
        created_at: habit.created_at,
        streak: current_streak_at(&habit.completed_dates, today),
        days,
        completed_today: habit.is_completed_on(today),
        can_mark_today: can_mark_on(habit, today),
        button_label: button_label(habit, today),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Streak,
    Created,
    NameAsc,
    NameDesc,
}

impl SortMode {
    /// Lenient: accepts select labels such as "Name (asc)".
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.contains("streak") {
            SortMode::Streak
        } else if lowered.contains("created") {
            SortMode::Created
        } else if lowered.contains("asc") {
            SortMode::NameAsc
        } else if lowered.contains("desc") {
            SortMode::NameDesc
        } else {
            SortMode::Streak
        }
    }
}

/// Query string of the list page and `/api/habits`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl HabitQuery {
    fn frequency_filter(&self) -> Option<Frequency> {
        let lowered = self.frequency.as_deref()?.trim().to_ascii_lowercase();
        [Frequency::Daily, Frequency::Weekly, Frequency::Custom]
            .into_iter()
            .find(|frequency| lowered.contains(frequency.as_str()))
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort.as_deref().map(SortMode::parse).unwrap_or_default()
    }

    fn matches(&self, habit: &Habit) -> bool {
        if let Some(frequency) = self.frequency_filter() {
            if habit.frequency != frequency {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => {
                habit.name.to_lowercase().contains(&term)
                    || habit
                        .description
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

pub fn list_views_at(data: &AppData, query: &HabitQuery, today: NaiveDate) -> Vec<HabitView> {
    let mut views: Vec<HabitView> = data
        .habits
        .iter()
        .filter(|habit| query.matches(habit))
        .map(|habit| build_view_at(habit, today))
        .collect();

    match query.sort_mode() {
        SortMode::Streak => views.sort_by_key(|view| Reverse(view.streak)),
        SortMode::Created => views.sort_by_key(|view| Reverse(view.created_at)),
        SortMode::NameAsc => views.sort_by_key(|view| view.name.to_lowercase()),
        SortMode::NameDesc => views.sort_by_key(|view| Reverse(view.name.to_lowercase())),
    }
    views
}
