use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/history", get(handlers::get_history))
        .route("/api/goals", post(handlers::create_goal))
        .route("/api/goals/reorder", post(handlers::reorder_goals))
        .route(
            "/api/goals/:id",
            put(handlers::update_goal).delete(handlers::delete_goal),
        )
        .route("/api/goals/:id/objective", put(handlers::set_goal_objective))
        .route("/api/entries/toggle", post(handlers::toggle_entry))
        .route(
            "/api/objectives",
            get(handlers::list_objectives).post(handlers::create_objective),
        )
        .route(
            "/api/objectives/:id",
            put(handlers::update_objective).delete(handlers::delete_objective),
        )
        .route("/api/objectives/:id/complete", post(handlers::complete_objective))
        .route("/api/tasks", post(handlers::create_task))
        .route(
            "/api/tasks/:id",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/api/tasks/:id/check", post(handlers::check_task))
        .route("/api/tasks/:id/archive", post(handlers::archive_task))
        .route("/api/milestones", post(handlers::create_milestone))
        .route(
            "/api/milestones/:id",
            put(handlers::update_milestone).delete(handlers::delete_milestone),
        )
        .route("/api/plans", get(handlers::list_plans).post(handlers::create_plan))
        .route("/api/plans/:id/archive", post(handlers::archive_plan))
        .route("/api/plans/:id/items", post(handlers::link_plan_item))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route("/api/completed", get(handlers::get_completed))
        .with_state(state)
}
