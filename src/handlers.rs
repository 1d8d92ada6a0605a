use crate::calendar::today;
use crate::errors::{AppError, TrackerError};
use crate::history::{HistoryTable, WeekSelection};
use crate::models::{
    AppData, CheckRequest, CompletedItem, DashboardQuery, DashboardResponse, Goal, GoalObjectiveRequest, GoalRequest,
    HistoryQuery, Milestone, MilestoneDraft, Objective, ObjectiveRequest, Plan, PlanDraft, PlanItem, ReorderRequest,
    Settings, Task, TaskDraft, ToggleRequest, ToggleResponse,
};
use crate::state::AppState;
use crate::stats::{build_history, build_stats};
use crate::storage::persist_data;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

/// Applies one mutation to a copy of the snapshot under the lock. The copy
/// replaces the live snapshot only once it has been written to disk.
async fn mutate<T>(
    state: &AppState,
    apply: impl FnOnce(&mut AppData) -> Result<T, TrackerError>,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let result = apply(&mut next)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    Ok(result)
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(build_stats(&data, query.week)?))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryTable>, AppError> {
    let selection = if query.all {
        WeekSelection::AllInRange
    } else {
        WeekSelection::WithData
    };
    let data = state.data.lock().await;
    Ok(Json(build_history(&data, selection)))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    let goal = mutate(&state, |data| {
        data.add_goal(&payload.name, payload.target, payload.objective_id)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<Goal>, AppError> {
    let goal = mutate(&state, |data| {
        data.update_goal(&id, &payload.name, payload.target, payload.objective_id)
    })
    .await?;
    Ok(Json(goal))
}

pub async fn set_goal_objective(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<GoalObjectiveRequest>,
) -> Result<StatusCode, AppError> {
    mutate(&state, |data| data.set_goal_objective(&id, payload.objective_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_goal(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, AppError> {
    mutate(&state, |data| data.delete_goal(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_goals(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = mutate(&state, |data| {
        data.reorder_goals(&payload.goal_ids)?;
        Ok(data.sorted_goals())
    })
    .await?;
    Ok(Json(goals))
}

pub async fn toggle_entry(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let date = payload.date.unwrap_or_else(today);
    let achieved = mutate(&state, |data| data.toggle_entry(&payload.goal_id, date)).await?;
    Ok(Json(ToggleResponse {
        goal_id: payload.goal_id,
        date,
        achieved,
    }))
}

pub async fn list_objectives(State(state): State<AppState>) -> Json<Vec<Objective>> {
    let data = state.data.lock().await;
    Json(data.active_objectives())
}

pub async fn create_objective(
    State(state): State<AppState>,
    Json(payload): Json<ObjectiveRequest>,
) -> Result<(StatusCode, Json<Objective>), AppError> {
    let objective = mutate(&state, |data| {
        data.save_objective(payload.draft, None, &payload.goal_ids)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(objective)))
}

pub async fn update_objective(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ObjectiveRequest>,
) -> Result<Json<Objective>, AppError> {
    let objective = mutate(&state, |data| {
        data.save_objective(payload.draft, Some(id.as_str()), &payload.goal_ids)
    })
    .await?;
    Ok(Json(objective))
}

pub async fn delete_objective(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    mutate(&state, |data| data.delete_objective(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_objective(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Objective>, AppError> {
    let objective = mutate(&state, |data| data.complete_objective(&id, Utc::now())).await?;
    Ok(Json(objective))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = mutate(&state, |data| data.add_task(payload, today())).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TaskDraft>,
) -> Result<Json<Task>, AppError> {
    let task = mutate(&state, |data| data.update_task(&id, payload)).await?;
    Ok(Json(task))
}

pub async fn check_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<Task>, AppError> {
    let task = mutate(&state, |data| data.set_task_checked(&id, payload.checked)).await?;
    Ok(Json(task))
}

pub async fn archive_task(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Task>, AppError> {
    let task = mutate(&state, |data| data.archive_task(&id, Utc::now())).await?;
    Ok(Json(task))
}

pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, AppError> {
    mutate(&state, |data| data.delete_task(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_milestone(
    State(state): State<AppState>,
    Json(payload): Json<MilestoneDraft>,
) -> Result<(StatusCode, Json<Milestone>), AppError> {
    let milestone = mutate(&state, |data| data.save_milestone(payload, None, today())).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

pub async fn update_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MilestoneDraft>,
) -> Result<Json<Milestone>, AppError> {
    let milestone = mutate(&state, |data| data.save_milestone(payload, Some(id.as_str()), today())).await?;
    Ok(Json(milestone))
}

pub async fn delete_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    mutate(&state, |data| data.delete_milestone(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    let data = state.data.lock().await;
    Json(data.active_plans())
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanDraft>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    let plan = mutate(&state, |data| data.save_plan(payload)).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn archive_plan(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Plan>, AppError> {
    let plan = mutate(&state, |data| data.archive_plan(&id, Utc::now())).await?;
    Ok(Json(plan))
}

pub async fn link_plan_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PlanItem>,
) -> Result<Json<Plan>, AppError> {
    let plan = mutate(&state, |data| data.link_plan_item(&id, payload)).await?;
    Ok(Json(plan))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    let data = state.data.lock().await;
    Json(data.settings.clone())
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    let settings = mutate(&state, |data| data.update_settings(payload)).await?;
    Ok(Json(settings))
}

pub async fn get_completed(State(state): State<AppState>) -> Json<Vec<CompletedItem>> {
    let data = state.data.lock().await;
    Json(data.completed_items())
}
