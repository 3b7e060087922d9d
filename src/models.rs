use chrono::{DateTime, FixedOffset, Local, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Custom => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "custom" => Ok(Frequency::Custom),
            other => Err(format!("unknown frequency '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Weekday names in `0 = sunday ... 6 = saturday` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayName {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayName {
    pub const ALL: [DayName; 7] = [
        DayName::Sunday,
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::from(date.weekday())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayName::Sunday => "sunday",
            DayName::Monday => "monday",
            DayName::Tuesday => "tuesday",
            DayName::Wednesday => "wednesday",
            DayName::Thursday => "thursday",
            DayName::Friday => "friday",
            DayName::Saturday => "saturday",
        }
    }

    /// Three-letter uppercase label shown in the day boxes.
    pub fn short_label(self) -> String {
        self.as_str()[..3].to_ascii_uppercase()
    }
}

impl From<Weekday> for DayName {
    fn from(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_sunday() as usize]
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == lowered)
            .ok_or_else(|| format!("unknown weekday '{lowered}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, alias = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(default, deserialize_with = "lenient_days")]
    pub selected_days: BTreeSet<DayName>,
    #[serde(default = "now_with_offset")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "lenient_dates")]
    pub completed_dates: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_override_date: Option<NaiveDate>,
}

impl Habit {
    /// Calendar day the daily window starts from.
    pub fn anchor_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }
}

/// Priority of a task; the derived order is High, Medium, Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown priority '{}'", s.trim()))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TaskStatus {
    #[default]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Ignores case, spaces, dashes and underscores: "in_progress" is "In Progress".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squashed: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match squashed.as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("unknown status '{}'", s.trim())),
        }
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default, rename = "desc", alias = "description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "due_date")]
    pub due: NaiveDate,
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default = "now_with_offset")]
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RuleTarget {
    #[default]
    Task,
    Habit,
}

impl RuleTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleTarget::Task => "Task",
            RuleTarget::Habit => "Habit",
        }
    }
}

impl FromStr for RuleTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(RuleTarget::Task),
            "habit" => Ok(RuleTarget::Habit),
            other => Err(format!("unknown rule target '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for RuleTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rules are identified by their name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub apply_to: RuleTarget,
}

/// Stored records that could not be read, kept verbatim so a write never drops them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkippedRecords {
    pub habits: Vec<Value>,
    pub tasks: Vec<Value>,
    pub rules: Vec<Value>,
}

impl SkippedRecords {
    pub fn is_empty(&self) -> bool {
        self.habits.is_empty() && self.tasks.is_empty() && self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppData {
    pub habits: Vec<Habit>,
    pub tasks: Vec<Task>,
    pub rules: Vec<Rule>,
    pub skipped: SkippedRecords,
}

impl AppData {
    pub fn find(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| habit.id == id)
    }

    pub fn find_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn find_task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }
}

fn now_with_offset() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Keeps a stored UUID; numeric or garbled ids from older files get a fresh one.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|text| Uuid::parse_str(text).ok())
        .unwrap_or_else(Uuid::new_v4))
}

/// Strings of a list that may be absent, `null`, or hold non-strings.
fn string_entries<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.as_str().map(str::to_string))
        .collect())
}

/// Accepts any casing and silently drops names that are not weekdays.
fn lenient_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<DayName>, D::Error> {
    let raw = string_entries(deserializer)?;
    Ok(raw.iter().filter_map(|name| name.parse().ok()).collect())
}

/// Strips any time-of-day suffix, drops unparsable entries and duplicates.
fn lenient_dates<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error> {
    let raw = string_entries(deserializer)?;
    let mut seen = HashSet::new();
    Ok(raw
        .iter()
        .filter_map(|entry| date_only(entry))
        .filter(|date| seen.insert(*date))
        .collect())
}

fn due_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    date_only(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid due date '{raw}'")))
}

pub fn date_only(entry: &str) -> Option<NaiveDate> {
    let day = entry.trim().split('T').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewHabit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub selected_days: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HabitEdit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: String,
}

/// Urlencoded create form; one optional field per weekday checkbox.
#[derive(Debug, Deserialize, Default)]
pub struct HabitFormInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: String,
    pub sunday: Option<String>,
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
}

impl From<HabitFormInput> for NewHabit {
    fn from(form: HabitFormInput) -> Self {
        let checks = [
            (DayName::Sunday, &form.sunday),
            (DayName::Monday, &form.monday),
            (DayName::Tuesday, &form.tuesday),
            (DayName::Wednesday, &form.wednesday),
            (DayName::Thursday, &form.thursday),
            (DayName::Friday, &form.friday),
            (DayName::Saturday, &form.saturday),
        ];
        let selected_days = checks
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(day, _)| day.as_str().to_string())
            .collect();
        NewHabit {
            selected_days,
            name: form.name,
            description: form.description,
            frequency: form.frequency,
        }
    }
}

/// Body of task create and edit, JSON or urlencoded.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskInput {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub due: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusInput {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MoveInput {
    #[serde(default)]
    pub direction: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SubtaskInput {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "applyTo")]
    pub apply_to: String,
}

/// Rule edit and delete from the page; the rule is named in a hidden field.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleFormInput {
    #[serde(default)]
    pub original_name: String,
    #[serde(flatten)]
    pub rule: RuleInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Completed,
    Missed,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub iso_date: NaiveDate,
    pub day_of_month: u32,
    pub weekday: DayName,
}

#[derive(Debug, Serialize)]
pub struct DayView {
    pub iso_date: NaiveDate,
    pub day_of_month: u32,
    pub weekday: DayName,
    pub short_label: String,
    pub status: DayStatus,
}

#[derive(Debug, Serialize)]
pub struct HabitView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub selected_days: Vec<DayName>,
    pub created_at: DateTime<FixedOffset>,
    pub streak: u32,
    pub days: Vec<DayView>,
    pub completed_today: bool,
    pub can_mark_today: bool,
    pub button_label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub outcome: &'static str,
    pub message: &'static str,
    pub habit: HabitView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangesResponse {
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}
