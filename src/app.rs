use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits", post(handlers::form_create))
        .route("/habits/:id/edit", post(handlers::form_edit))
        .route("/habits/:id/delete", post(handlers::form_delete))
        .route("/habits/:id/toggle", post(handlers::form_toggle))
        .route("/tasks", get(handlers::tasks_page).post(handlers::form_create_task))
        .route("/tasks/:id/edit", post(handlers::form_edit_task))
        .route("/tasks/:id/delete", post(handlers::form_delete_task))
        .route("/tasks/:id/status", post(handlers::form_task_status))
        .route("/tasks/:id/move", post(handlers::form_move_task))
        .route("/tasks/:id/subtasks", post(handlers::form_add_subtask))
        .route("/tasks/:id/subtasks/:index/toggle", post(handlers::form_toggle_subtask))
        .route("/tasks/:id/subtasks/:index/edit", post(handlers::form_edit_subtask))
        .route("/tasks/:id/subtasks/:index/delete", post(handlers::form_delete_subtask))
        .route("/rules", get(handlers::rules_page).post(handlers::form_create_rule))
        .route("/rules/edit", post(handlers::form_edit_rule))
        .route("/rules/delete", post(handlers::form_delete_rule))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/api/tasks", get(handlers::list_task_records).post(handlers::create_task))
        .route(
            "/api/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/tasks/:id/status", put(handlers::update_task_status))
        .route("/api/tasks/:id/move", post(handlers::move_task_record))
        .route("/api/tasks/:id/subtasks", post(handlers::create_subtask))
        .route(
            "/api/tasks/:id/subtasks/:index",
            put(handlers::update_subtask).delete(handlers::remove_subtask),
        )
        .route("/api/tasks/:id/subtasks/:index/toggle", post(handlers::toggle_subtask_done))
        .route("/api/stats/tasks", get(handlers::get_task_stats))
        .route("/api/rules", get(handlers::list_rules).post(handlers::create_rule))
        .route(
            "/api/rules/:name",
            put(handlers::update_rule_by_name).delete(handlers::delete_rule_by_name),
        )
        .route("/api/changes", get(handlers::wait_for_changes))
        .with_state(state)
}
