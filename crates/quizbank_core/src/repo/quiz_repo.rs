//! Quiz repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map the four record-store operations onto the `quizzes` table.
//! - Assign store ids on insert and re-stamp `updated_at` on replace.
//!
//! # Invariants
//! - Missing records are reported as `None`/`false`, never as errors.
//! - Read paths reject undecodable persisted state instead of masking it.
//! - `replace` never changes the stored id or `created_at`, and returns the
//!   record as stored.

use crate::db::DbError;
use crate::model::quiz::{now_utc, Difficulty, Quiz, QuizId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const QUIZ_SELECT_SQL: &str = "SELECT
    id,
    question,
    options,
    correct_answer,
    category,
    difficulty,
    created_at,
    updated_at
FROM quizzes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for quiz persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted quiz data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Narrow record-store contract consumed by `QuizService`.
pub trait QuizRepository {
    /// Returns the stored quiz, or `None` when no record has `id`.
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Quiz>>;
    /// Inserts `quiz` and returns it carrying the store-assigned id.
    fn create(&self, quiz: Quiz) -> RepoResult<Quiz>;
    /// Replaces the mutable fields of the record matching `id`.
    ///
    /// Returns the stored record, or `None` unless exactly one record was
    /// modified. The stored id and `created_at` are kept.
    fn replace(&self, id: &str, quiz: Quiz) -> RepoResult<Option<Quiz>>;
    /// Deletes the record matching `id`; returns whether one was removed.
    fn delete(&self, id: &str) -> RepoResult<bool>;
}

/// SQLite-backed quiz repository.
pub struct SqliteQuizRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuizRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl QuizRepository for SqliteQuizRepository<'_> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Quiz>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{QUIZ_SELECT_SQL} WHERE id = ?1;"))?;

        let row = stmt.query_row([id], read_quiz_row).optional()?;
        row.map(StoredQuiz::into_quiz).transpose()
    }

    fn create(&self, mut quiz: Quiz) -> RepoResult<Quiz> {
        let id = Uuid::new_v4().simple().to_string();
        let options = encode_options(&quiz.options)?;

        self.conn.execute(
            "INSERT INTO quizzes (
                id,
                question,
                options,
                correct_answer,
                category,
                difficulty,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.as_str(),
                quiz.question.as_str(),
                options,
                quiz.correct_answer,
                quiz.category.as_str(),
                quiz.difficulty.as_str(),
                quiz.created_at.timestamp_millis(),
                quiz.updated_at.timestamp_millis(),
            ],
        )?;

        quiz.id = Some(id);
        Ok(quiz)
    }

    fn replace(&self, id: &str, quiz: Quiz) -> RepoResult<Option<Quiz>> {
        let options = encode_options(&quiz.options)?;

        // `updated_at` must end up past the stored value even when the clock
        // has not moved since the previous write.
        let changed = self.conn.execute(
            "UPDATE quizzes
             SET
                question = ?1,
                options = ?2,
                correct_answer = ?3,
                category = ?4,
                difficulty = ?5,
                updated_at = MAX(?6, updated_at + 1)
             WHERE id = ?7;",
            params![
                quiz.question.as_str(),
                options,
                quiz.correct_answer,
                quiz.category.as_str(),
                quiz.difficulty.as_str(),
                now_utc().timestamp_millis(),
                id,
            ],
        )?;

        if changed != 1 {
            return Ok(None);
        }

        self.get_by_id(id)
    }

    fn delete(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM quizzes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// Raw column values, decoded outside the rusqlite row callback so that
/// decode failures surface as `RepoError::InvalidData`.
struct StoredQuiz {
    id: QuizId,
    question: String,
    options: String,
    correct_answer: i64,
    category: String,
    difficulty: String,
    created_at: i64,
    updated_at: i64,
}

fn read_quiz_row(row: &Row<'_>) -> rusqlite::Result<StoredQuiz> {
    Ok(StoredQuiz {
        id: row.get("id")?,
        question: row.get("question")?,
        options: row.get("options")?,
        correct_answer: row.get("correct_answer")?,
        category: row.get("category")?,
        difficulty: row.get("difficulty")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl StoredQuiz {
    fn into_quiz(self) -> RepoResult<Quiz> {
        let options: Vec<String> = serde_json::from_str(&self.options).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid options `{}` in quizzes.options: {err}",
                self.options
            ))
        })?;

        let correct_answer = u32::try_from(self.correct_answer).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid correct_answer value `{}` in quizzes.correct_answer",
                self.correct_answer
            ))
        })?;

        let difficulty = Difficulty::parse(&self.difficulty).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid difficulty `{}` in quizzes.difficulty",
                self.difficulty
            ))
        })?;

        Ok(Quiz {
            id: Some(self.id),
            question: self.question,
            options,
            correct_answer,
            category: self.category,
            difficulty,
            created_at: parse_epoch_ms(self.created_at, "created_at")?,
            updated_at: parse_epoch_ms(self.updated_at, "updated_at")?,
        })
    }
}

fn encode_options(options: &[String]) -> RepoResult<String> {
    serde_json::to_string(options)
        .map_err(|err| RepoError::InvalidData(format!("options are not encodable: {err}")))
}

fn parse_epoch_ms(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in quizzes.{column}"))
    })
}
