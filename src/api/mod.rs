//! REST API for repsheet

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{DatabaseError, RepsheetError};
use crate::manager::PositionManager;
use crate::models::{NewUser, NewWorkout, User, Workout, WorkoutUpdate};
use crate::storage::WorkoutStore;

/// Application state shared across handlers
pub struct AppState<S: WorkoutStore> {
    pub manager: PositionManager<S>,
}

/// Create the API router
pub fn router<S: WorkoutStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        // Users
        .route("/users", post(create_user::<S>))
        .route("/users/:id", get(get_user::<S>).delete(delete_user::<S>))
        .route(
            "/users/:id/workouts",
            get(list_workouts::<S>)
                .post(add_workout::<S>)
                .delete(delete_all_workouts::<S>),
        )
        // Workouts
        .route(
            "/workouts/:id",
            get(get_workout::<S>)
                .put(update_workout::<S>)
                .delete(delete_workout::<S>),
        )
        .route("/workouts/:id/shift", post(shift_workout::<S>))
        // Health
        .route("/health", get(health_check::<S>))
        .with_state(state)
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddWorkoutRequest {
    #[serde(flatten)]
    pub workout: NewWorkout,
    pub position: i32,
}

#[derive(Debug, Deserialize)]
pub struct ShiftWorkoutRequest {
    pub position: i32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

// === Handlers ===

async fn create_user<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state
        .manager
        .store()
        .insert_user(&NewUser::new(req.name))
        .await?;
    tracing::info!(user_id = user.id, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    Ok(Json(require_user(&state, id).await?))
}

async fn delete_user<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = state
        .manager
        .store()
        .delete_user(id)
        .await?
        .ok_or(RepsheetError::UserNotFound { id })?;
    tracing::info!(user_id = id, "Deleted user");
    Ok(Json(user))
}

/// `null` when the user exists but has no workouts
async fn list_workouts<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Option<Vec<Workout>>>, AppError> {
    require_user(&state, user_id).await?;
    Ok(Json(state.manager.get_ordered(user_id).await?))
}

async fn add_workout<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<i64>,
    Json(req): Json<AddWorkoutRequest>,
) -> Result<(StatusCode, Json<Workout>), AppError> {
    require_user(&state, user_id).await?;
    let workout = state
        .manager
        .insert(user_id, req.workout, req.position)
        .await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn delete_all_workouts<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.manager.delete_all(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_workout<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Workout>, AppError> {
    Ok(Json(state.manager.get(id).await?))
}

async fn update_workout<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(req): Json<WorkoutUpdate>,
) -> Result<Json<Workout>, AppError> {
    Ok(Json(state.manager.update(id, req).await?))
}

async fn delete_workout<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Workout>, AppError> {
    Ok(Json(state.manager.delete(id).await?))
}

async fn shift_workout<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Json(req): Json<ShiftWorkoutRequest>,
) -> Result<Json<Vec<Workout>>, AppError> {
    Ok(Json(state.manager.shift(id, req.position).await?))
}

async fn health_check<S: WorkoutStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<HealthResponse>, AppError> {
    let db_status = match state.manager.store().ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database: db_status.to_string(),
    }))
}

async fn require_user<S: WorkoutStore>(state: &AppState<S>, id: i64) -> Result<User, AppError> {
    let user = state
        .manager
        .store()
        .get_user(id)
        .await?
        .ok_or(RepsheetError::UserNotFound { id })?;
    Ok(user)
}

// === Error handling ===

pub struct AppError(RepsheetError);

impl From<RepsheetError> for AppError {
    fn from(e: RepsheetError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            RepsheetError::InvalidPosition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RepsheetError::Database(DatabaseError::Conflict(_)) => StatusCode::CONFLICT,
            RepsheetError::Database(DatabaseError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            RepsheetError::Database(DatabaseError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
