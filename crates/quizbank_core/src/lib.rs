//! Core domain logic for the quiz bank service.
//! This crate is the single source of truth for quiz invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::quiz::{now_utc, Difficulty, Quiz, QuizId};
pub use model::validation::{FieldError, NewQuiz, QuizPatch, QuizValidationError};
pub use repo::quiz_repo::{QuizRepository, RepoError, RepoResult, SqliteQuizRepository};
pub use service::quiz_service::{QuizResponse, QuizService, QuizServiceError, ServiceResult};

/// Minimal health-check API used by the HTTP probe.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
