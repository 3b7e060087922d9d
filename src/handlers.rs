use crate::completion::{toggle_completion, ToggleOutcome};
use crate::errors::{AppError, HabitError};
use crate::manage::{apply_edit, create_habit as new_habit};
use crate::models::{
    ChangesResponse, Habit, HabitEdit, HabitFormInput, HabitView, MoveInput, NewHabit, Rule,
    RuleFormInput, RuleInput, StatusInput, SubtaskInput, Task, TaskInput, TaskStats,
    ToggleResponse,
};
use crate::rules::{delete_rule, save_rule, update_rule};
use crate::state::AppState;
use crate::tasks::{
    add_subtask, apply_task_edit, create_task as new_task, delete_subtask, edit_subtask,
    list_tasks, move_task, set_status, task_stats, toggle_subtask, MoveDirection, TaskQuery,
};
use crate::ui::{render_index, render_rules_page, render_tasks_page, Notice, NoticeQuery};
use crate::view::{build_view_at, list_views_at, HabitQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

const CHANGE_WAIT: Duration = Duration::from_secs(25);

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HabitQuery>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let today = state.clock.today();
    let data = state.store.load().await;
    let views = list_views_at(&data, &query, today);
    Html(render_index(today, &views, &query, state.store.revision(), notice.notice()))
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<HabitQuery>,
) -> Json<Vec<HabitView>> {
    let data = state.store.load().await;
    Json(list_views_at(&data, &query, state.clock.today()))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HabitView>, AppError> {
    let data = state.store.load().await;
    let habit = data.find(id).ok_or(HabitError::NotFound(id))?;
    Ok(Json(build_view_at(habit, state.clock.today())))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(input): Json<NewHabit>,
) -> Result<(StatusCode, Json<HabitView>), AppError> {
    let habit = insert_habit(&state, input).await?;
    Ok((StatusCode::CREATED, Json(build_view_at(&habit, state.clock.today()))))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<HabitEdit>,
) -> Result<Json<HabitView>, AppError> {
    let habit = edit_habit(&state, id, edit).await?;
    Ok(Json(build_view_at(&habit, state.clock.today())))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    remove_habit(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    let (outcome, habit) = apply_toggle(&state, id).await?;
    Ok(Json(ToggleResponse {
        outcome: outcome.as_str(),
        message: outcome.message(),
        habit: build_view_at(&habit, state.clock.today()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    #[serde(default)]
    pub since: u64,
}

pub async fn wait_for_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Json<ChangesResponse> {
    let revision = state.store.wait_for_change(query.since, CHANGE_WAIT).await;
    Json(ChangesResponse { revision })
}

pub async fn form_create(
    State(state): State<AppState>,
    Form(form): Form<HabitFormInput>,
) -> Result<Redirect, AppError> {
    insert_habit(&state, NewHabit::from(form)).await?;
    Ok(Redirect::to(&Notice::HabitSaved.location("/")))
}

pub async fn form_edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(edit): Form<HabitEdit>,
) -> Result<Redirect, AppError> {
    let edited = skip_missing(edit_habit(&state, id, edit).await)?;
    Ok(back_to("/", edited.map(|_| Notice::HabitUpdated)))
}

pub async fn form_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let removed = skip_missing(remove_habit(&state, id).await)?;
    Ok(back_to("/", removed.map(|_| Notice::HabitRemoved)))
}

pub async fn form_toggle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let toggled = skip_missing(apply_toggle(&state, id).await)?;
    Ok(back_to("/", toggled.map(|(outcome, _)| Notice::from(outcome))))
}

/// Page forms act on whatever the user last saw; a record deleted meanwhile
/// is not an error for them.
fn skip_missing<T>(result: Result<T, HabitError>) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_missing() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn back_to(page: &str, notice: Option<Notice>) -> Redirect {
    match notice {
        Some(notice) => Redirect::to(&notice.location(page)),
        None => Redirect::to(page),
    }
}

async fn insert_habit(state: &AppState, input: NewHabit) -> Result<Habit, HabitError> {
    let habit = new_habit(input, state.clock.now())?;
    let stored = habit.clone();
    state
        .store
        .mutate(move |data| {
            data.habits.push(stored);
            Ok(())
        })
        .await?;
    info!(id = %habit.id, name = %habit.name, frequency = %habit.frequency, "habit created");
    Ok(habit)
}

async fn edit_habit(state: &AppState, id: Uuid, edit: HabitEdit) -> Result<Habit, HabitError> {
    let habit = state
        .store
        .mutate(move |data| {
            let habit = data.find_mut(id).ok_or(HabitError::NotFound(id))?;
            apply_edit(habit, edit)?;
            Ok(habit.clone())
        })
        .await?;
    info!(%id, "habit updated");
    Ok(habit)
}

async fn remove_habit(state: &AppState, id: Uuid) -> Result<(), HabitError> {
    state
        .store
        .mutate(move |data| {
            let position = data
                .habits
                .iter()
                .position(|habit| habit.id == id)
                .ok_or(HabitError::NotFound(id))?;
            data.habits.remove(position);
            Ok(())
        })
        .await?;
    info!(%id, "habit removed");
    Ok(())
}

async fn apply_toggle(state: &AppState, id: Uuid) -> Result<(ToggleOutcome, Habit), HabitError> {
    let today = state.clock.today();
    let (outcome, habit) = state
        .store
        .mutate(move |data| {
            let habit = data.find_mut(id).ok_or(HabitError::NotFound(id))?;
            let outcome = toggle_completion(habit, today)?;
            Ok((outcome, habit.clone()))
        })
        .await?;
    info!(%id, %today, outcome = outcome.as_str(), "habit toggled");
    Ok((outcome, habit))
}

pub async fn tasks_page(
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let data = state.store.load().await;
    Html(render_tasks_page(&data.tasks, task_stats(&data.tasks), notice.notice()))
}

pub async fn list_task_records(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Json<Vec<Task>> {
    let data = state.store.load().await;
    Json(list_tasks(&data.tasks, &query))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let data = state.store.load().await;
    let task = data.find_task(id).ok_or(HabitError::TaskNotFound(id))?;
    Ok(Json(task.clone()))
}

pub async fn get_task_stats(State(state): State<AppState>) -> Json<TaskStats> {
    let data = state.store.load().await;
    Json(task_stats(&data.tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = insert_task(&state, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Task>, AppError> {
    let edit = |task: &mut Task| apply_task_edit(task, input);
    let task = change_task(&state, id, "task updated", edit).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    remove_task(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Task>, AppError> {
    let update = |task: &mut Task| set_status(task, &input.status);
    let task = change_task(&state, id, "task status changed", update).await?;
    Ok(Json(task))
}

pub async fn move_task_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<MoveInput>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = shift_task(&state, id, &input.direction).await?;
    Ok(Json(tasks))
}

pub async fn create_subtask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SubtaskInput>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let add = |task: &mut Task| add_subtask(task, &input.text).map(drop);
    let task = change_task(&state, id, "subtask added", add).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_subtask(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(input): Json<SubtaskInput>,
) -> Result<Json<Task>, AppError> {
    let edit = |task: &mut Task| edit_subtask(task, index, &input.text);
    let task = change_task(&state, id, "subtask edited", edit).await?;
    Ok(Json(task))
}

pub async fn remove_subtask(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<Task>, AppError> {
    let remove = |task: &mut Task| delete_subtask(task, index).map(drop);
    let task = change_task(&state, id, "subtask removed", remove).await?;
    Ok(Json(task))
}

pub async fn toggle_subtask_done(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<Task>, AppError> {
    let toggle = |task: &mut Task| toggle_subtask(task, index).map(drop);
    let task = change_task(&state, id, "subtask toggled", toggle).await?;
    Ok(Json(task))
}

pub async fn form_create_task(
    State(state): State<AppState>,
    Form(input): Form<TaskInput>,
) -> Result<Redirect, AppError> {
    insert_task(&state, input).await?;
    Ok(Redirect::to(&Notice::TaskSaved.location("/tasks")))
}

pub async fn form_edit_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(input): Form<TaskInput>,
) -> Result<Redirect, AppError> {
    let edit = |task: &mut Task| apply_task_edit(task, input);
    let edited = skip_missing(change_task(&state, id, "task updated", edit).await)?;
    Ok(back_to("/tasks", edited.map(|_| Notice::TaskUpdated)))
}

pub async fn form_delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let removed = skip_missing(remove_task(&state, id).await)?;
    Ok(back_to("/tasks", removed.map(|_| Notice::TaskRemoved)))
}

pub async fn form_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(input): Form<StatusInput>,
) -> Result<Redirect, AppError> {
    let update = |task: &mut Task| set_status(task, &input.status);
    skip_missing(change_task(&state, id, "task status changed", update).await)?;
    Ok(Redirect::to("/tasks"))
}

pub async fn form_move_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(input): Form<MoveInput>,
) -> Result<Redirect, AppError> {
    skip_missing(shift_task(&state, id, &input.direction).await)?;
    Ok(Redirect::to("/tasks"))
}

pub async fn form_add_subtask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(input): Form<SubtaskInput>,
) -> Result<Redirect, AppError> {
    let add = |task: &mut Task| add_subtask(task, &input.text).map(drop);
    skip_missing(change_task(&state, id, "subtask added", add).await)?;
    Ok(Redirect::to("/tasks"))
}

pub async fn form_edit_subtask(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Form(input): Form<SubtaskInput>,
) -> Result<Redirect, AppError> {
    let edit = |task: &mut Task| edit_subtask(task, index, &input.text);
    skip_missing(change_task(&state, id, "subtask edited", edit).await)?;
    Ok(Redirect::to("/tasks"))
}

pub async fn form_delete_subtask(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Redirect, AppError> {
    let remove = |task: &mut Task| delete_subtask(task, index).map(drop);
    skip_missing(change_task(&state, id, "subtask removed", remove).await)?;
    Ok(Redirect::to("/tasks"))
}

pub async fn form_toggle_subtask(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Redirect, AppError> {
    let toggle = |task: &mut Task| toggle_subtask(task, index).map(drop);
    skip_missing(change_task(&state, id, "subtask toggled", toggle).await)?;
    Ok(Redirect::to("/tasks"))
}

async fn insert_task(state: &AppState, input: TaskInput) -> Result<Task, HabitError> {
    let task = new_task(input, state.clock.now())?;
    let stored = task.clone();
    state
        .store
        .mutate(move |data| {
            data.tasks.push(stored);
            Ok(())
        })
        .await?;
    info!(id = %task.id, title = %task.title, priority = %task.priority, "task created");
    Ok(task)
}

/// Runs `change` on one task inside a store write and returns the result.
async fn change_task<F>(
    state: &AppState,
    id: Uuid,
    event: &'static str,
    change: F,
) -> Result<Task, HabitError>
where
    F: FnOnce(&mut Task) -> Result<(), HabitError>,
{
    let task = state
        .store
        .mutate(move |data| {
            let task = data.find_task_mut(id).ok_or(HabitError::TaskNotFound(id))?;
            change(task)?;
            Ok(task.clone())
        })
        .await?;
    info!(%id, "{event}");
    Ok(task)
}

async fn remove_task(state: &AppState, id: Uuid) -> Result<(), HabitError> {
    state
        .store
        .mutate(move |data| {
            let position = data
                .tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or(HabitError::TaskNotFound(id))?;
            data.tasks.remove(position);
            Ok(())
        })
        .await?;
    info!(%id, "task removed");
    Ok(())
}

async fn shift_task(state: &AppState, id: Uuid, direction: &str) -> Result<Vec<Task>, HabitError> {
    let direction: MoveDirection = direction.parse().map_err(HabitError::Validation)?;
    let (moved, tasks) = state
        .store
        .mutate(move |data| {
            let moved = move_task(&mut data.tasks, id, direction)?;
            Ok((moved, data.tasks.clone()))
        })
        .await?;
    info!(%id, ?direction, moved, "task moved");
    Ok(tasks)
}

pub async fn rules_page(
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let data = state.store.load().await;
    Html(render_rules_page(&data.rules, notice.notice()))
}

pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<Rule>> {
    Json(state.store.load().await.rules)
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<RuleInput>,
) -> Result<(StatusCode, Json<Rule>), AppError> {
    let rule = insert_rule(&state, input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn update_rule_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<RuleInput>,
) -> Result<Json<Rule>, AppError> {
    let rule = replace_rule(&state, name, input).await?;
    Ok(Json(rule))
}

pub async fn delete_rule_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    drop_rule(&state, name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn form_create_rule(
    State(state): State<AppState>,
    Form(input): Form<RuleInput>,
) -> Result<Redirect, AppError> {
    insert_rule(&state, input).await?;
    Ok(Redirect::to(&Notice::RuleSaved.location("/rules")))
}

pub async fn form_edit_rule(
    State(state): State<AppState>,
    Form(form): Form<RuleFormInput>,
) -> Result<Redirect, AppError> {
    let edited = skip_missing(replace_rule(&state, form.original_name, form.rule).await)?;
    Ok(back_to("/rules", edited.map(|_| Notice::RuleUpdated)))
}

pub async fn form_delete_rule(
    State(state): State<AppState>,
    Form(input): Form<RuleInput>,
) -> Result<Redirect, AppError> {
    let removed = skip_missing(drop_rule(&state, input.name).await)?;
    Ok(back_to("/rules", removed.map(|_| Notice::RuleRemoved)))
}

async fn insert_rule(state: &AppState, input: RuleInput) -> Result<Rule, HabitError> {
    let rule = state.store.mutate(move |data| save_rule(&mut data.rules, input)).await?;
    info!(name = %rule.name, apply_to = rule.apply_to.as_str(), "rule saved");
    Ok(rule)
}

async fn replace_rule(
    state: &AppState,
    name: String,
    input: RuleInput,
) -> Result<Rule, HabitError> {
    let rule = state
        .store
        .mutate(|data| update_rule(&mut data.rules, &name, input))
        .await?;
    info!(previous = %name, name = %rule.name, "rule updated");
    Ok(rule)
}

async fn drop_rule(state: &AppState, name: String) -> Result<Rule, HabitError> {
    let rule = state.store.mutate(|data| delete_rule(&mut data.rules, &name)).await?;
    info!(name = %rule.name, "rule removed");
    Ok(rule)
}
