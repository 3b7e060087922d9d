use crate::errors::HabitError;
use crate::models::{DayName, Frequency, Habit, HabitEdit, NewHabit};
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeSet;
use uuid::Uuid;

pub const REQUIRED_FIELDS: &str = "Please fill all required fields!";
pub const SAVED: &str = "Your habit has been saved successfully!";
pub const UPDATED: &str = "All set! your changes have been saved successfully!";
pub const REMOVED: &str = "Done! your habit has been removed";

pub fn create_habit(input: NewHabit, now: DateTime<FixedOffset>) -> Result<Habit, HabitError> {
    let (name, frequency) = required_fields(&input.name, &input.frequency)?;

    let selected_days: BTreeSet<DayName> = if frequency == Frequency::Daily {
        BTreeSet::new()
    } else {
        input
            .selected_days
            .iter()
            .map(|day| day.parse::<DayName>().map_err(HabitError::Validation))
            .collect::<Result<_, _>>()?
    };

    Ok(Habit {
        id: Uuid::new_v4(),
        name,
        description: clean_description(input.description),
        frequency,
        selected_days,
        created_at: now,
        completed_dates: Vec::new(),
        label_override_date: None,
    })
}

/// Applies name, description and frequency; schedule days and history stay.
pub fn apply_edit(habit: &mut Habit, edit: HabitEdit) -> Result<(), HabitError> {
    let (name, frequency) = required_fields(&edit.name, &edit.frequency)?;
    habit.name = name;
    habit.description = clean_description(edit.description);
    habit.frequency = frequency;
    Ok(())
}

fn required_fields(name: &str, frequency: &str) -> Result<(String, Frequency), HabitError> {
    let name = name.trim();
    let frequency = frequency.trim();
    if name.is_empty() || frequency.is_empty() {
        return Err(HabitError::Validation(REQUIRED_FIELDS.to_string()));
    }
    let frequency = frequency.parse().map_err(HabitError::Validation)?;
    Ok((name.to_string(), frequency))
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
