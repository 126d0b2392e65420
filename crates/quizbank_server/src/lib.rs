//! HTTP surface for the quiz bank.
//!
//! # Responsibility
//! - Route `/quizzes` requests to `QuizService` use-cases.
//! - Map service outcomes to status codes and JSON bodies.
//!
//! # Invariants
//! - Shared state holds only the database path; every request opens its
//!   own connection on the blocking pool.
//! - Storage details never reach response bodies.

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().merge(routes::routes()).with_state(state)
}
