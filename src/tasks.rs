use crate::errors::HabitError;
use crate::models::{date_only, Priority, Subtask, Task, TaskInput, TaskStats, TaskStatus};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

pub const TASK_REQUIRED: &str = "Please fill in all required fields.";
pub const TASK_SAVED: &str = "Your task has been saved successfully!";
pub const TASK_UPDATED: &str = "All set! Your changes have been saved successfully!";
pub const TASK_REMOVED: &str = "Done! Your item has been removed.";
pub const SUBTASK_REQUIRED: &str = "Subtask text cannot be empty.";

pub fn create_task(input: TaskInput, now: DateTime<FixedOffset>) -> Result<Task, HabitError> {
    let fields = TaskFields::parse(input)?;
    Ok(Task {
        id: Uuid::new_v4(),
        title: fields.title,
        description: fields.description,
        due: fields.due,
        priority: fields.priority,
        status: fields.status,
        subtasks: Vec::new(),
        created_at: now,
    })
}

/// Replaces the editable fields; id, subtasks and creation time stay.
pub fn apply_task_edit(task: &mut Task, input: TaskInput) -> Result<(), HabitError> {
    let fields = TaskFields::parse(input)?;
    task.title = fields.title;
    task.description = fields.description;
    task.due = fields.due;
    task.priority = fields.priority;
    task.status = fields.status;
    Ok(())
}

pub fn set_status(task: &mut Task, raw: &str) -> Result<(), HabitError> {
    task.status = raw.parse().map_err(HabitError::Validation)?;
    Ok(())
}

struct TaskFields {
    title: String,
    description: Option<String>,
    due: NaiveDate,
    priority: Priority,
    status: TaskStatus,
}

impl TaskFields {
    fn parse(input: TaskInput) -> Result<Self, HabitError> {
        let title = input.title.trim();
        let priority = input.priority.trim();
        let due = input.due.trim();
        if title.is_empty() || priority.is_empty() || due.is_empty() {
            return Err(HabitError::Validation(TASK_REQUIRED.to_string()));
        }
        let due = date_only(due)
            .ok_or_else(|| HabitError::Validation(format!("invalid due date '{due}'")))?;
        let priority = priority.parse().map_err(HabitError::Validation)?;
        let status = if input.status.trim().is_empty() {
            TaskStatus::default()
        } else {
            input.status.parse().map_err(HabitError::Validation)?
        };
        Ok(Self {
            title: title.to_string(),
            description: input
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            due,
            priority,
            status,
        })
    }
}

/// Appends an open subtask and returns its index.
pub fn add_subtask(task: &mut Task, text: &str) -> Result<usize, HabitError> {
    let text = subtask_text(text)?;
    task.subtasks.push(Subtask { text, done: false });
    Ok(task.subtasks.len() - 1)
}

/// Flips the done flag and returns the new value.
pub fn toggle_subtask(task: &mut Task, index: usize) -> Result<bool, HabitError> {
    let id = task.id;
    let subtask = task
        .subtasks
        .get_mut(index)
        .ok_or(HabitError::SubtaskNotFound { task: id, index })?;
    subtask.done = !subtask.done;
    Ok(subtask.done)
}

pub fn edit_subtask(task: &mut Task, index: usize, text: &str) -> Result<(), HabitError> {
    let text = subtask_text(text)?;
    let id = task.id;
    let subtask = task
        .subtasks
        .get_mut(index)
        .ok_or(HabitError::SubtaskNotFound { task: id, index })?;
    subtask.text = text;
    Ok(())
}

pub fn delete_subtask(task: &mut Task, index: usize) -> Result<Subtask, HabitError> {
    if index >= task.subtasks.len() {
        return Err(HabitError::SubtaskNotFound { task: task.id, index });
    }
    Ok(task.subtasks.remove(index))
}

fn subtask_text(text: &str) -> Result<String, HabitError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(HabitError::Validation(SUBTASK_REQUIRED.to_string()));
    }
    Ok(text.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl std::str::FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Swaps the task with its neighbour. Returns false when it is already at
/// that end of the list.
pub fn move_task(tasks: &mut [Task], id: Uuid, direction: MoveDirection) -> Result<bool, HabitError> {
    let index = tasks
        .iter()
        .position(|task| task.id == id)
        .ok_or(HabitError::TaskNotFound(id))?;
    match direction {
        MoveDirection::Up if index > 0 => tasks.swap(index - 1, index),
        MoveDirection::Down if index + 1 < tasks.len() => tasks.swap(index, index + 1),
        _ => return Ok(false),
    }
    Ok(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    #[default]
    Created,
    Due,
    Priority,
}

impl TaskSort {
    /// Lenient: "dueDate", "due" and "Due date" all sort by due date.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.contains("due") {
            TaskSort::Due
        } else if lowered.contains("priority") {
            TaskSort::Priority
        } else {
            TaskSort::Created
        }
    }
}

/// Query string of `/api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl TaskQuery {
    fn matches(&self, task: &Task) -> bool {
        // "all" and anything unrecognised leave a filter off.
        if let Some(Ok(status)) = self.status.as_deref().map(str::parse::<TaskStatus>) {
            if task.status != status {
                return false;
            }
        }
        if let Some(Ok(priority)) = self.priority.as_deref().map(str::parse::<Priority>) {
            if task.priority != priority {
                return false;
            }
        }
        match self.search.as_deref().map(|term| term.trim().to_lowercase()) {
            Some(term) if !term.is_empty() => task.title.to_lowercase().contains(&term),
            _ => true,
        }
    }

    pub fn sort(&self) -> TaskSort {
        self.sort.as_deref().map(TaskSort::parse).unwrap_or_default()
    }
}

/// Filtered and sorted copy; stored order breaks ties.
pub fn list_tasks(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let mut listed: Vec<Task> = tasks.iter().filter(|task| query.matches(task)).cloned().collect();
    match query.sort() {
        TaskSort::Created => listed.sort_by_key(|task| task.created_at),
        TaskSort::Due => listed.sort_by_key(|task| task.due),
        TaskSort::Priority => listed.sort_by_key(|task| task.priority),
    }
    listed
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();
    TaskStats {
        total: tasks.len(),
        todo: count(TaskStatus::Todo),
        in_progress: count(TaskStatus::InProgress),
        completed: count(TaskStatus::Completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 10, 9, 0, 0)
            .unwrap()
    }

    fn input(title: &str, due: &str, priority: &str) -> TaskInput {
        TaskInput {
            title: title.into(),
            due: due.into(),
            priority: priority.into(),
            ..TaskInput::default()
        }
    }

    fn task(title: &str, due: &str, priority: &str, minutes: i64) -> Task {
        create_task(input(title, due, priority), now() + Duration::minutes(minutes)).unwrap()
    }

    #[test]
    fn create_requires_title_priority_and_due() {
        for missing in [input(" ", "2024-02-01", "High"), input("Pay rent", "", "High"), input("Pay rent", "2024-02-01", "")] {
            let err = create_task(missing, now()).unwrap_err();
            assert_eq!(err.to_string(), TASK_REQUIRED);
        }
        assert!(create_task(input("Pay rent", "someday", "High"), now()).is_err());
        assert!(create_task(input("Pay rent", "2024-02-01", "urgent"), now()).is_err());
    }

    #[test]
    fn create_trims_and_defaults_status() {
        let created = create_task(
            TaskInput {
                description: Some("  ".into()),
                ..input("  Pay rent ", "2024-02-01", "medium")
            },
            now(),
        )
        .unwrap();
        assert_eq!(created.title, "Pay rent");
        assert!(created.description.is_none());
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.status, TaskStatus::Todo);
        assert!(created.subtasks.is_empty());
        assert_eq!(created.created_at, now());
    }

    #[test]
    fn edit_keeps_subtasks_and_identity() {
        let mut t = task("Report", "2024-02-01", "Low", 0);
        add_subtask(&mut t, "outline").unwrap();
        let id = t.id;
        apply_task_edit(
            &mut t,
            TaskInput {
                status: "Completed".into(),
                ..input("Final report", "2024-02-03", "High")
            },
        )
        .unwrap();
        assert_eq!(t.id, id);
        assert_eq!(t.title, "Final report");
        assert_eq!(t.status, TaskStatus::Completed);
        assert_eq!(t.subtasks.len(), 1);
        assert_eq!(t.created_at, now());

        let before = t.clone();
        assert!(apply_task_edit(&mut t, TaskInput::default()).is_err());
        assert_eq!(t, before);
    }

    #[test]
    fn status_updates_reject_unknown_values() {
        let mut t = task("Report", "2024-02-01", "Low", 0);
        set_status(&mut t, "In Progress").unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);
        assert!(set_status(&mut t, "paused").is_err());
        assert_eq!(t.status, TaskStatus::InProgress);
    }

    #[test]
    fn subtasks_add_toggle_edit_delete() {
        let mut t = task("Move house", "2024-03-01", "High", 0);
        assert_eq!(add_subtask(&mut t, " boxes ").unwrap(), 0);
        assert_eq!(add_subtask(&mut t, "van").unwrap(), 1);
        assert!(add_subtask(&mut t, "   ").is_err());

        assert!(toggle_subtask(&mut t, 1).unwrap());
        assert!(!toggle_subtask(&mut t, 1).unwrap());
        edit_subtask(&mut t, 0, "buy boxes").unwrap();
        assert!(edit_subtask(&mut t, 0, "").is_err());
        assert_eq!(t.subtasks[0].text, "buy boxes");

        let removed = delete_subtask(&mut t, 0).unwrap();
        assert_eq!(removed.text, "buy boxes");
        assert_eq!(t.subtasks.len(), 1);
        assert!(matches!(
            toggle_subtask(&mut t, 5),
            Err(HabitError::SubtaskNotFound { index: 5, .. })
        ));
        assert!(delete_subtask(&mut t, 1).is_err());
    }

    #[test]
    fn move_swaps_neighbours_and_stops_at_the_ends() {
        let mut tasks = vec![
            task("a", "2024-02-01", "Low", 0),
            task("b", "2024-02-01", "Low", 1),
            task("c", "2024-02-01", "Low", 2),
        ];
        let first = tasks[0].id;
        assert!(!move_task(&mut tasks, first, MoveDirection::Up).unwrap());
        assert!(move_task(&mut tasks, first, MoveDirection::Down).unwrap());
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c"]);

        let last = tasks[2].id;
        assert!(!move_task(&mut tasks, last, MoveDirection::Down).unwrap());
        assert!(matches!(
            move_task(&mut tasks, Uuid::new_v4(), MoveDirection::Up),
            Err(HabitError::TaskNotFound(_))
        ));
    }

    #[test]
    fn filter_and_sort() {
        let mut done = task("Write report", "2024-01-20", "Low", 0);
        done.status = TaskStatus::Completed;
        let tasks = vec![
            done,
            task("Call plumber", "2024-01-12", "High", 1),
            task("Write letter", "2024-01-15", "Medium", 2),
        ];
        let titles = |query: TaskQuery| -> Vec<String> {
            list_tasks(&tasks, &query).into_iter().map(|t| t.title).collect()
        };

        assert_eq!(
            titles(TaskQuery { search: Some("WRITE".into()), ..TaskQuery::default() }),
            vec!["Write report", "Write letter"]
        );
        assert_eq!(
            titles(TaskQuery { status: Some("Completed".into()), ..TaskQuery::default() }),
            vec!["Write report"]
        );
        assert_eq!(
            titles(TaskQuery { priority: Some("all".into()), ..TaskQuery::default() }).len(),
            3
        );
        assert_eq!(
            titles(TaskQuery { sort: Some("dueDate".into()), ..TaskQuery::default() }),
            vec!["Call plumber", "Write letter", "Write report"]
        );
        assert_eq!(
            titles(TaskQuery { sort: Some("priority".into()), ..TaskQuery::default() }),
            vec!["Call plumber", "Write letter", "Write report"]
        );
        assert_eq!(
            titles(TaskQuery::default()),
            vec!["Write report", "Call plumber", "Write letter"]
        );
    }

    #[test]
    fn stats_count_by_status() {
        let mut tasks = vec![
            task("a", "2024-02-01", "Low", 0),
            task("b", "2024-02-01", "Low", 1),
            task("c", "2024-02-01", "Low", 2),
        ];
        tasks[1].status = TaskStatus::InProgress;
        tasks[2].status = TaskStatus::Completed;
        assert_eq!(
            task_stats(&tasks),
            TaskStats { total: 3, todo: 1, in_progress: 1, completed: 1 }
        );
    }
}
