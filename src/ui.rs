use crate::completion::ToggleOutcome;
use crate::manage::{REMOVED, REQUIRED_FIELDS, SAVED, UPDATED};
use crate::models::{
    DayName, DayStatus, Frequency, HabitView, Priority, Rule, RuleTarget, Task, TaskStats,
    TaskStatus,
};
use crate::rules::{RULE_REMOVED, RULE_SAVED, RULE_UPDATED};
use crate::tasks::{TASK_REMOVED, TASK_SAVED, TASK_UPDATED};
use crate::view::{HabitQuery, SortMode};
use chrono::NaiveDate;
use serde::Deserialize;

/// A one-shot status line carried through a form redirect as `?notice=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    HabitSaved,
    HabitUpdated,
    HabitRemoved,
    MarkedComplete,
    LabelToggled,
    TaskSaved,
    TaskUpdated,
    TaskRemoved,
    RuleSaved,
    RuleUpdated,
    RuleRemoved,
}

impl Notice {
    const ALL: [Notice; 11] = [
        Notice::HabitSaved,
        Notice::HabitUpdated,
        Notice::HabitRemoved,
        Notice::MarkedComplete,
        Notice::LabelToggled,
        Notice::TaskSaved,
        Notice::TaskUpdated,
        Notice::TaskRemoved,
        Notice::RuleSaved,
        Notice::RuleUpdated,
        Notice::RuleRemoved,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Notice::HabitSaved => "habit_saved",
            Notice::HabitUpdated => "habit_updated",
            Notice::HabitRemoved => "habit_removed",
            Notice::MarkedComplete => ToggleOutcome::MarkedComplete.as_str(),
            Notice::LabelToggled => ToggleOutcome::LabelToggled.as_str(),
            Notice::TaskSaved => "task_saved",
            Notice::TaskUpdated => "task_updated",
            Notice::TaskRemoved => "task_removed",
            Notice::RuleSaved => "rule_saved",
            Notice::RuleUpdated => "rule_updated",
            Notice::RuleRemoved => "rule_removed",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::HabitSaved => SAVED,
            Notice::HabitUpdated => UPDATED,
            Notice::HabitRemoved => REMOVED,
            Notice::MarkedComplete => ToggleOutcome::MarkedComplete.message(),
            Notice::LabelToggled => ToggleOutcome::LabelToggled.message(),
            Notice::TaskSaved => TASK_SAVED,
            Notice::TaskUpdated => TASK_UPDATED,
            Notice::TaskRemoved => TASK_REMOVED,
            Notice::RuleSaved => RULE_SAVED,
            Notice::RuleUpdated => RULE_UPDATED,
            Notice::RuleRemoved => RULE_REMOVED,
        }
    }

    /// Unknown codes are ignored, so only fixed messages ever reach the page.
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code.trim())
    }

    /// Redirect target showing this notice on `page`.
    pub fn location(self, page: &str) -> String {
        format!("{page}?notice={}", self.code())
    }
}

impl From<ToggleOutcome> for Notice {
    fn from(outcome: ToggleOutcome) -> Self {
        match outcome {
            ToggleOutcome::MarkedComplete => Notice::MarkedComplete,
            ToggleOutcome::LabelToggled => Notice::LabelToggled,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
}

impl NoticeQuery {
    pub fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::parse)
    }
}

pub fn render_index(
    today: NaiveDate,
    habits: &[HabitView],
    query: &HabitQuery,
    revision: u64,
    notice: Option<Notice>,
) -> String {
    let cards = if habits.is_empty() {
        EMPTY_STATE.to_string()
    } else {
        habits.iter().map(render_card).collect::<Vec<_>>().join("\n")
    };

    // User text goes in last, so placeholder lookalikes in it are never expanded.
    INDEX_HTML
        .replace("{{NAV}}", &render_nav("/"))
        .replace("{{TODAY}}", &today.format("%A, %B %-d, %Y").to_string())
        .replace("{{DAY_CHECKBOXES}}", &render_day_checkboxes())
        .replace("{{REVISION}}", &revision.to_string())
        .replace("{{MSG_SAVED}}", SAVED)
        .replace("{{MSG_UPDATED}}", UPDATED)
        .replace("{{MSG_REMOVED}}", REMOVED)
        .replace("{{MSG_REQUIRED}}", REQUIRED_FIELDS)
        .replace("{{STATUS}}", &notice_text(notice))
        .replace("{{TOOLBAR}}", &render_toolbar(query))
        .replace("{{HABITS}}", &cards)
}

/// Escapes markup and braces, so rendered user text can never look like a
/// template placeholder.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

fn notice_text(notice: Option<Notice>) -> String {
    notice.map(|notice| escape_html(notice.message())).unwrap_or_default()
}

fn render_nav(active: &str) -> String {
    [("/", "Habits"), ("/tasks", "Tasks"), ("/rules", "Rules")]
        .into_iter()
        .map(|(href, label)| {
            let class = if href == active { r#" class="active""# } else { "" };
            format!(r#"<a href="{href}"{class}>{label}</a>"#)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_card(habit: &HabitView) -> String {
    let id = habit.id.to_string();
    let name = escape_html(&habit.name);
    let description = habit
        .description
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "No description provided.".to_string());

    let days: String = habit
        .days
        .iter()
        .map(|day| {
            let class = match day.status {
                DayStatus::Completed => "completed",
                DayStatus::Missed => "missed",
                DayStatus::Neutral => "neutral",
            };
            format!(
                r#"<div class="day-box {class}" title="{iso}"><span class="date">{dom}</span><span class="day">{label}</span></div>"#,
                iso = day.iso_date,
                dom = day.day_of_month,
                label = day.short_label,
            )
        })
        .collect();

    let schedule = if habit.frequency == Frequency::Daily || habit.selected_days.is_empty() {
        habit.frequency.to_string()
    } else {
        let names: Vec<_> = habit.selected_days.iter().map(|day| day.short_label()).collect();
        format!("{} · {}", habit.frequency, names.join(", "))
    };

    let button_class = if habit.completed_today { "mark-complete done" } else { "mark-complete" };
    let disabled = if habit.can_mark_today { "" } else { " disabled" };

    format!(
        r#"<article class="habit-card" data-id="{id}" data-name="{name}">
  <div class="habit-header">
    <div>
      <h3>{name}</h3>
      <p class="subtitle">{description}</p>
    </div>
    <div class="habit-actions">
      <form class="toggle-form" method="post" action="/habits/{id}/toggle">
        <button class="{button_class}" type="submit"{disabled}>{label}</button>
      </form>
      <form class="delete-form" method="post" action="/habits/{id}/delete">
        <button class="btn-delete" type="submit">Delete</button>
      </form>
    </div>
  </div>
  <div class="habit-meta">
    <span class="freq">{schedule}</span>
    <span class="streak">{streak} day streak</span>
    <span class="window-label">Next 7 occurrences</span>
  </div>
  <div class="habit-days">{days}</div>
  <details class="edit">
    <summary>Edit</summary>
    <form class="edit-form" method="post" action="/habits/{id}/edit">
      <input type="text" name="name" value="{name}" required />
      <textarea name="description" rows="2">{raw_description}</textarea>
      <select name="frequency">{frequency_options}</select>
      <button type="submit">Save changes</button>
    </form>
  </details>
</article>"#,
        label = habit.button_label,
        streak = habit.streak,
        raw_description = habit.description.as_deref().map(escape_html).unwrap_or_default(),
        frequency_options = frequency_options(Some(habit.frequency)),
    )
}

fn frequency_options(selected: Option<Frequency>) -> String {
    [Frequency::Daily, Frequency::Weekly, Frequency::Custom]
        .into_iter()
        .map(|frequency| {
            let marker = if Some(frequency) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{marker}>{label}</option>"#,
                value = frequency.as_str(),
                label = capitalize(frequency.as_str()),
            )
        })
        .collect()
}

fn render_toolbar(query: &HabitQuery) -> String {
    let search = query.search.as_deref().map(escape_html).unwrap_or_default();
    let current_frequency = query
        .frequency
        .as_deref()
        .and_then(|raw| raw.parse::<Frequency>().ok());
    let all_marker = if current_frequency.is_none() { " selected" } else { "" };
    let sort = query.sort_mode();
    let sort_options: String = [
        (SortMode::Streak, "streak", "Streak"),
        (SortMode::Created, "created", "Newest"),
        (SortMode::NameAsc, "asc", "Name A-Z"),
        (SortMode::NameDesc, "desc", "Name Z-A"),
    ]
    .into_iter()
    .map(|(mode, value, label)| {
        let marker = if mode == sort { " selected" } else { "" };
        format!(r#"<option value="{value}"{marker}>{label}</option>"#)
    })
    .collect();

    format!(
        r#"<form class="toolbar" method="get" action="/">
  <input type="search" name="search" placeholder="Search habits" value="{search}" />
  <select name="frequency"><option value="all"{all_marker}>All Frequency</option>{frequency_options}</select>
  <select name="sort">{sort_options}</select>
  <button type="submit">Apply</button>
</form>"#,
        frequency_options = frequency_options(current_frequency),
    )
}

fn render_day_checkboxes() -> String {
    DayName::ALL
        .iter()
        .map(|day| {
            format!(
                r#"<label class="day-check"><input type="checkbox" name="{name}" value="on" /> {label}</label>"#,
                name = day.as_str(),
                label = capitalize(day.as_str()),
            )
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_tasks_page(tasks: &[Task], stats: TaskStats, notice: Option<Notice>) -> String {
    let cards = if tasks.is_empty() {
        r#"<div class="empty-state"><p>No tasks found. Create your first task to get started!</p></div>"#.to_string()
    } else {
        tasks.iter().map(render_task_card).collect::<Vec<_>>().join("\n")
    };
    let content = format!(
        r#"<div class="counters">
  <span>Total <strong>{total}</strong></span>
  <span>Todo <strong>{todo}</strong></span>
  <span>In Progress <strong>{in_progress}</strong></span>
  <span>Completed <strong>{completed}</strong></span>
</div>
<form class="create-form" method="post" action="/tasks">
  <input type="text" name="title" placeholder="Task title" required />
  <input type="text" name="description" placeholder="Description (optional)" />
  <input type="date" name="due" required />
  <select name="priority" required><option value="" selected>Priority</option>{priorities}</select>
  <select name="status">{statuses}</select>
  <button type="submit">Add task</button>
</form>
<section class="list">
{cards}
</section>"#,
        total = stats.total,
        todo = stats.todo,
        in_progress = stats.in_progress,
        completed = stats.completed,
        priorities = priority_options(None),
        statuses = status_options(TaskStatus::Todo),
    );
    render_page("Tasks", "/tasks", notice, &content)
}

fn render_task_card(task: &Task) -> String {
    let id = task.id.to_string();
    let title = escape_html(&task.title);
    let description = task.description.as_deref().map(escape_html).unwrap_or_default();
    let done = if task.status == TaskStatus::Completed { " done" } else { "" };
    let icon = match task.priority {
        Priority::High => "🔥",
        Priority::Medium => "⚡",
        Priority::Low => "🕓",
    };

    let subtasks: String = if task.subtasks.is_empty() {
        r#"<li class="none">No subtasks</li>"#.to_string()
    } else {
        task.subtasks
            .iter()
            .enumerate()
            .map(|(index, subtask)| {
                let text = escape_html(&subtask.text);
                let (class, mark) = if subtask.done { ("subtask done", "☑") } else { ("subtask", "☐") };
                format!(
                    r#"<li class="{class}">
  <form method="post" action="/tasks/{id}/subtasks/{index}/toggle"><button type="submit">{mark}</button></form>
  <span>{text}</span>
  <form method="post" action="/tasks/{id}/subtasks/{index}/edit"><input type="text" name="text" value="{text}" required /><button type="submit">Save</button></form>
  <form method="post" action="/tasks/{id}/subtasks/{index}/delete"><button class="btn-delete" type="submit">Delete</button></form>
</li>"#
                )
            })
            .collect()
    };

    format!(
        r#"<article class="card" data-id="{id}">
  <div class="card-header">
    <h3 class="title{done}">{title}</h3>
    <div class="actions">
      <form method="post" action="/tasks/{id}/move"><input type="hidden" name="direction" value="up" /><button type="submit" title="Move up">▲</button></form>
      <form method="post" action="/tasks/{id}/move"><input type="hidden" name="direction" value="down" /><button type="submit" title="Move down">▼</button></form>
      <form method="post" action="/tasks/{id}/delete"><button class="btn-delete" type="submit">Delete</button></form>
    </div>
  </div>
  <p class="subtitle">{description}</p>
  <div class="meta">
    <span class="priority {priority_class}">{icon} {priority}</span>
    <span class="due">Due {due}</span>
    <form method="post" action="/tasks/{id}/status"><select name="status">{statuses}</select><button type="submit">Set</button></form>
  </div>
  <details>
    <summary>Subtasks ({count})</summary>
    <ul class="subtasks">{subtasks}</ul>
    <form method="post" action="/tasks/{id}/subtasks"><input type="text" name="text" placeholder="Add subtask..." required /><button type="submit">Add</button></form>
  </details>
  <details class="edit">
    <summary>Edit</summary>
    <form method="post" action="/tasks/{id}/edit">
      <input type="text" name="title" value="{title}" required />
      <textarea name="description" rows="2">{description}</textarea>
      <input type="date" name="due" value="{due}" required />
      <select name="priority">{priorities}</select>
      <select name="status">{statuses}</select>
      <button type="submit">Save changes</button>
    </form>
  </details>
</article>"#,
        priority = task.priority,
        priority_class = task.priority.as_str().to_ascii_lowercase(),
        due = task.due.format("%Y-%m-%d"),
        statuses = status_options(task.status),
        priorities = priority_options(Some(task.priority)),
        count = task.subtasks.len(),
    )
}

fn priority_options(selected: Option<Priority>) -> String {
    Priority::ALL
        .into_iter()
        .map(|priority| {
            let marker = if Some(priority) == selected { " selected" } else { "" };
            format!(r#"<option value="{priority}"{marker}>{priority}</option>"#)
        })
        .collect()
}

fn status_options(selected: TaskStatus) -> String {
    TaskStatus::ALL
        .into_iter()
        .map(|status| {
            let marker = if status == selected { " selected" } else { "" };
            format!(r#"<option value="{status}"{marker}>{status}</option>"#)
        })
        .collect()
}

pub fn render_rules_page(rules: &[Rule], notice: Option<Notice>) -> String {
    let cards = if rules.is_empty() {
        r#"<div class="empty-state"><p>No rules yet. Create automation rules to manage your tasks and habits</p></div>"#.to_string()
    } else {
        rules.iter().map(render_rule_card).collect::<Vec<_>>().join("\n")
    };
    let content = format!(
        r#"<form class="create-form" method="post" action="/rules">
  <input type="text" name="name" placeholder="Rule name" required />
  <input type="text" name="description" placeholder="Description" />
  <select name="apply_to">{targets}</select>
  <button type="submit">Add rule</button>
</form>
<section class="list">
{cards}
</section>"#,
        targets = target_options(RuleTarget::Task),
    );
    render_page("Rules", "/rules", notice, &content)
}

fn render_rule_card(rule: &Rule) -> String {
    let name = escape_html(&rule.name);
    format!(
        r#"<article class="card">
  <div class="card-header">
    <h3>{name} <span class="tag {tag_class}">{target}</span></h3>
    <form method="post" action="/rules/delete"><input type="hidden" name="name" value="{name}" /><button class="btn-delete" type="submit">Delete</button></form>
  </div>
  <p class="subtitle">{description}</p>
  <details class="edit">
    <summary>Edit</summary>
    <form method="post" action="/rules/edit">
      <input type="hidden" name="original_name" value="{name}" />
      <input type="text" name="name" value="{name}" required />
      <textarea name="description" rows="2">{description}</textarea>
      <select name="apply_to">{targets}</select>
      <button type="submit">Save changes</button>
    </form>
  </details>
</article>"#,
        target = rule.apply_to.as_str(),
        tag_class = rule.apply_to.as_str().to_ascii_lowercase(),
        description = escape_html(&rule.description),
        targets = target_options(rule.apply_to),
    )
}

fn target_options(selected: RuleTarget) -> String {
    [RuleTarget::Task, RuleTarget::Habit]
        .into_iter()
        .map(|target| {
            let marker = if target == selected { " selected" } else { "" };
            let value = target.as_str();
            format!(r#"<option value="{value}"{marker}>{value}</option>"#)
        })
        .collect()
}

fn render_page(title: &str, active: &str, notice: Option<Notice>, content: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", title)
        .replace("{{NAV}}", &render_nav(active))
        .replace("{{STATUS}}", &notice_text(notice))
        .replace("{{CONTENT}}", content)
}

const EMPTY_STATE: &str = r#"<div class="empty-state"><p>No habits yet. Create your first habit to start building streaks!</p></div>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef4ec;
      --bg-2: #c9e4d2;
      --ink: #1f2a24;
      --accent: #2e8b57;
      --missed: #ff4c4c;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(31, 42, 36, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #f4f9f1 60%, #fbfdf9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(920px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h3 {
      margin: 0 0 4px;
    }

    .subtitle {
      margin: 0;
      color: #5f665f;
    }

    form {
      margin: 0;
    }

    input, textarea, select, button {
      font: inherit;
      border-radius: 12px;
      border: 1px solid #cfd8cf;
      padding: 8px 12px;
    }

    button {
      cursor: pointer;
      background: #fff;
    }

    button:disabled {
      opacity: 0.6;
      cursor: not-allowed;
    }

    .toolbar, .create-form {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .create-form .days {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .create-form .days.hidden {
      display: none;
    }

    .habit-card {
      border: 1px solid #e2e9e2;
      border-radius: 20px;
      padding: 20px;
      display: grid;
      gap: 12px;
    }

    .habit-header {
      display: flex;
      justify-content: space-between;
      gap: 12px;
    }

    .habit-actions {
      display: flex;
      gap: 8px;
      align-items: start;
    }

    .mark-complete.done {
      background: var(--accent);
      color: #fff;
    }

    .btn-delete {
      color: #dc3545;
    }

    .habit-meta {
      display: flex;
      gap: 16px;
      color: #4a544b;
      font-size: 0.95rem;
    }

    .habit-days {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
    }

    .day-box {
      border-radius: 10px;
      border: 1px solid #dfe6df;
      padding: 8px 4px;
      display: grid;
      justify-items: center;
    }

    .day-box.completed {
      background: var(--accent);
      color: #fff;
    }

    .day-box.missed {
      background: var(--missed);
      color: #fff;
    }

    .day-box .date {
      font-weight: 600;
      font-size: 1.1rem;
    }

    .day-box .day {
      font-size: 0.75rem;
      letter-spacing: 0.06em;
    }

    .empty-state {
      text-align: center;
      color: #6f756f;
      padding: 24px;
    }

    .status {
      min-height: 1.4em;
      color: #2d7a4b;
    }

    .nav {
      display: flex;
      gap: 16px;
    }

    .nav a {
      color: #4a544b;
      text-decoration: none;
    }

    .nav a.active {
      color: var(--accent);
      font-weight: 600;
    }

    .status[data-type="error"] {
      color: #c0392b;
    }

    details.edit form {
      display: grid;
      gap: 8px;
      margin-top: 8px;
    }
  </style>
</head>
<body>
  <main class="app">
    <nav class="nav">{{NAV}}</nav>
    <header>
      <h1>Habits</h1>
      <p class="subtitle">Today is {{TODAY}}.</p>
    </header>
    <section>
      <form id="create-form" class="create-form" method="post" action="/habits">
        <input type="text" name="name" placeholder="Habit name" required />
        <input type="text" name="description" placeholder="Description (optional)" />
        <select id="frequency-select" name="frequency" required>
          <option value="" selected>Frequency</option>
          <option value="daily">Daily</option>
          <option value="weekly">Weekly</option>
          <option value="custom">Custom</option>
        </select>
        <div id="day-select" class="days hidden">{{DAY_CHECKBOXES}}</div>
        <button type="submit">Add habit</button>
      </form>
    </section>
    {{TOOLBAR}}
    <div class="status" id="status">{{STATUS}}</div>
    <section id="habits" class="habits">
{{HABITS}}
    </section>
  </main>
  <script>
    const statusEl = document.getElementById('status');
    const createForm = document.getElementById('create-form');
    const frequencySelect = document.getElementById('frequency-select');
    const daySelect = document.getElementById('day-select');
    const dayBoxes = Array.from(daySelect.querySelectorAll('input[type="checkbox"]'));
    let revision = {{REVISION}};

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const flash = sessionStorage.getItem('flash');
    if (flash) {
      setStatus(flash);
      sessionStorage.removeItem('flash');
    }

    const reloadWith = (message) => {
      if (message) {
        sessionStorage.setItem('flash', message);
      }
      window.location.reload();
    };

    const send = async (url, options, message) => {
      const response = await fetch(url, options);
      if (!response.ok) {
        setStatus(await response.text(), 'error');
        return null;
      }
      const body = response.status === 204 ? null : await response.json();
      reloadWith(message || (body && body.message));
      return body;
    };

    frequencySelect.addEventListener('change', () => {
      const value = frequencySelect.value;
      daySelect.classList.toggle('hidden', value !== 'weekly' && value !== 'custom');
      dayBoxes.forEach((box) => (box.checked = false));
    });

    dayBoxes.forEach((box) => {
      box.addEventListener('change', () => {
        if (frequencySelect.value === 'weekly' && box.checked) {
          dayBoxes.forEach((other) => {
            if (other !== box) other.checked = false;
          });
        }
      });
    });

    createForm.addEventListener('submit', (event) => {
      event.preventDefault();
      const data = new FormData(createForm);
      const name = (data.get('name') || '').trim();
      const frequency = data.get('frequency') || '';
      if (!name || !frequency) {
        setStatus('{{MSG_REQUIRED}}', 'error');
        return;
      }
      send('/api/habits', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
          name,
          description: data.get('description') || null,
          frequency,
          selected_days: dayBoxes.filter((box) => box.checked).map((box) => box.name)
        })
      }, '{{MSG_SAVED}}');
    });

    document.querySelectorAll('.habit-card').forEach((card) => {
      const id = card.dataset.id;
      card.querySelector('.toggle-form').addEventListener('submit', (event) => {
        event.preventDefault();
        send(`/api/habits/${id}/toggle`, { method: 'POST' });
      });
      card.querySelector('.delete-form').addEventListener('submit', (event) => {
        event.preventDefault();
        if (!confirm(`Are you sure you want to delete the ${card.dataset.name}?`)) {
          return;
        }
        send(`/api/habits/${id}`, { method: 'DELETE' }, '{{MSG_REMOVED}}');
      });
      const editForm = card.querySelector('.edit-form');
      editForm.addEventListener('submit', (event) => {
        event.preventDefault();
        const data = new FormData(editForm);
        send(`/api/habits/${id}`, {
          method: 'PUT',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({
            name: data.get('name') || '',
            description: data.get('description') || null,
            frequency: data.get('frequency') || ''
          })
        }, '{{MSG_UPDATED}}');
      });
    });

    const watchChanges = async () => {
      for (;;) {
        try {
          const response = await fetch(`/api/changes?since=${revision}`);
          const body = await response.json();
          if (body.revision > revision) {
            reloadWith();
            return;
          }
        } catch (err) {
          await new Promise((resolve) => setTimeout(resolve, 5000));
        }
      }
    };
    watchChanges();
  </script>
</body>
</html>
"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: linear-gradient(135deg, #eef4ec, #fbfdf9);
      color: #1f2a24;
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(920px, 100%);
      background: rgba(255, 255, 255, 0.9);
      border-radius: 28px;
      padding: 36px;
      display: grid;
      gap: 20px;
    }

    form {
      margin: 0;
      display: inline-flex;
      gap: 6px;
      align-items: center;
    }

    input, textarea, select, button {
      font: inherit;
      border-radius: 10px;
      border: 1px solid #cfd8cf;
      padding: 6px 10px;
    }

    .nav, .counters, .create-form, .meta, .actions, .card-header {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .card-header {
      justify-content: space-between;
    }

    .nav a {
      color: #4a544b;
      text-decoration: none;
    }

    .nav a.active {
      color: #2e8b57;
      font-weight: 600;
    }

    .card {
      border: 1px solid #e2e9e2;
      border-radius: 20px;
      padding: 16px 20px;
      margin-bottom: 12px;
      display: grid;
      gap: 8px;
    }

    .title.done, .subtask.done span {
      text-decoration: line-through;
      color: gray;
    }

    .priority.high { background: #f8d7da; }
    .priority.medium { background: #fff3cd; }
    .priority.low { background: #d4edda; }

    .priority, .tag {
      border-radius: 20px;
      padding: 3px 10px;
      font-size: 13px;
    }

    .tag.task { background: #f0f0f0; }
    .tag.habit { background: #e3f2fd; }

    .subtasks {
      list-style: none;
      padding: 0;
    }

    .subtasks li {
      display: flex;
      gap: 8px;
      align-items: center;
      padding: 4px 0;
    }

    .btn-delete {
      color: #dc3545;
    }

    .subtitle, .empty-state {
      color: #5f665f;
    }

    .status {
      min-height: 1.4em;
      color: #2d7a4b;
    }
  </style>
</head>
<body>
  <main class="app">
    <nav class="nav">{{NAV}}</nav>
    <h1>{{TITLE}}</h1>
    <div class="status" id="status">{{STATUS}}</div>
{{CONTENT}}
  </main>
</body>
</html>
"#;
