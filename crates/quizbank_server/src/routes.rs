//! Quiz routes.
//!
//! # Responsibility
//! - Decode JSON payloads and path ids for the four quiz use-cases.
//! - Run each use-case against a per-request connection on the blocking pool.
//!
//! # Invariants
//! - A use-case returning `None`/`false` maps to 404, including an update
//!   whose replace modified no record.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use quizbank_core::db::open_db;
use quizbank_core::{
    NewQuiz, QuizPatch, QuizResponse, QuizService, RepoError, ServiceResult,
    SqliteQuizRepository,
};

use crate::error::{Action, AppError};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/quizzes", post(create_quiz))
        .route(
            "/quizzes/{id}",
            get(get_quiz).put(update_quiz).delete(delete_quiz),
        )
}

async fn health() -> &'static str {
    quizbank_core::ping()
}

async fn create_quiz(
    State(state): State<AppState>,
    payload: Result<Json<NewQuiz>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    let created = run_service(&state, Action::Creating, move |service| {
        service.create(input)
    })
    .await?;

    let location = format!("/quizzes/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuizResponse>, AppError> {
    let lookup_id = id.clone();
    run_service(&state, Action::Retrieving, move |service| {
        service.get_by_id(&lookup_id)
    })
    .await?
    .map(Json)
    .ok_or(AppError::NotFound(id))
}

async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<QuizPatch>, JsonRejection>,
) -> Result<Json<QuizResponse>, AppError> {
    let Json(patch) = payload?;

    let lookup_id = id.clone();
    run_service(&state, Action::Updating, move |service| {
        service.update(&lookup_id, patch)
    })
    .await?
    .map(Json)
    .ok_or(AppError::NotFound(id))
}

async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let lookup_id = id.clone();
    let deleted = run_service(&state, Action::Deleting, move |service| {
        service.delete(&lookup_id)
    })
    .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(id))
    }
}

/// Opens a per-request connection on the blocking pool and runs `action`
/// against a fresh service.
async fn run_service<T, F>(state: &AppState, action: Action, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: for<'conn> FnOnce(QuizService<SqliteQuizRepository<'conn>>) -> ServiceResult<T>
        + Send
        + 'static,
{
    let db_path = state.db_path.clone();

    let outcome = tokio::task::spawn_blocking(move || match open_db(db_path.as_path()) {
        Ok(conn) => Ok(f(QuizService::new(SqliteQuizRepository::new(&conn)))),
        Err(err) => Err(RepoError::from(err)),
    })
    .await
    .map_err(|err| AppError::internal(action, err))?;

    match outcome {
        Ok(result) => result.map_err(|err| AppError::from_service(action, err)),
        Err(err) => Err(AppError::internal(action, err)),
    }
}
