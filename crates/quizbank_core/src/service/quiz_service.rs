//! Quiz use-case service.
//!
//! # Responsibility
//! - Provide create/get/update/delete entry points for the HTTP layer.
//! - Run creation validation and patch merging before any write.
//! - Convert persisted records into the external `QuizResponse` shape.
//!
//! # Invariants
//! - Nothing reaches the repository without passing validation first.
//! - "Not found" is `Ok(None)` / `Ok(false)`, never an error.
//! - Validation failures log at `warn`; storage failures log at `error`.

use crate::model::quiz::{Difficulty, Quiz, QuizId};
use crate::model::validation::{NewQuiz, QuizPatch, QuizValidationError};
use crate::repo::quiz_repo::{QuizRepository, RepoError};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Externally visible quiz representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: QuizId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: u32,
    pub category: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id.unwrap_or_default(),
            question: quiz.question,
            options: quiz.options,
            correct_answer: quiz.correct_answer,
            category: quiz.category,
            difficulty: quiz.difficulty,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

/// Service error for quiz use-cases.
#[derive(Debug)]
pub enum QuizServiceError {
    /// Payload violated one or more rules; safe to show to the caller.
    Validation(QuizValidationError),
    /// Record-store failure; details stay server-side.
    Storage(RepoError),
}

impl Display for QuizServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "quiz storage failure: {err}"),
        }
    }
}

impl Error for QuizServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<QuizValidationError> for QuizServiceError {
    fn from(value: QuizValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for QuizServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

pub type ServiceResult<T> = Result<T, QuizServiceError>;

/// Quiz service facade over repository implementations.
pub struct QuizService<R: QuizRepository> {
    repo: R,
}

impl<R: QuizRepository> QuizService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and persists a new quiz.
    pub fn create(&self, input: NewQuiz) -> ServiceResult<QuizResponse> {
        let quiz = input.validate().map_err(|err| {
            warn!(
                "event=quiz_create module=service status=rejected errors={}",
                err.errors().len()
            );
            err
        })?;

        let created = self
            .repo
            .create(quiz)
            .map_err(|err| storage_failure("quiz_create", None, err))?;

        info!(
            "event=quiz_create module=service status=ok id={}",
            created.id.as_deref().unwrap_or_default()
        );
        Ok(created.into())
    }

    /// Gets one quiz by id; `Ok(None)` when it does not exist.
    pub fn get_by_id(&self, id: &str) -> ServiceResult<Option<QuizResponse>> {
        let quiz = self
            .repo
            .get_by_id(id)
            .map_err(|err| storage_failure("quiz_get", Some(id), err))?;
        Ok(quiz.map(QuizResponse::from))
    }

    /// Merges `patch` into the stored quiz and persists the result.
    ///
    /// # Contract
    /// - Returns `Ok(None)` when `id` does not exist, including when the
    ///   record disappears between the read and the replace.
    /// - Fields absent from `patch` keep their stored value.
    pub fn update(&self, id: &str, patch: QuizPatch) -> ServiceResult<Option<QuizResponse>> {
        let Some(existing) = self
            .repo
            .get_by_id(id)
            .map_err(|err| storage_failure("quiz_update", Some(id), err))?
        else {
            return Ok(None);
        };

        let merged = patch.merge_into(existing).map_err(|err| {
            warn!(
                "event=quiz_update module=service status=rejected id={} errors={}",
                id,
                err.errors().len()
            );
            err
        })?;

        let replaced = self
            .repo
            .replace(id, merged)
            .map_err(|err| storage_failure("quiz_update", Some(id), err))?;

        if replaced.is_some() {
            info!("event=quiz_update module=service status=ok id={id}");
        }
        Ok(replaced.map(QuizResponse::from))
    }

    /// Hard-deletes a quiz. Returns whether a record was removed.
    pub fn delete(&self, id: &str) -> ServiceResult<bool> {
        let deleted = self
            .repo
            .delete(id)
            .map_err(|err| storage_failure("quiz_delete", Some(id), err))?;

        if deleted {
            info!("event=quiz_delete module=service status=ok id={id}");
        }
        Ok(deleted)
    }
}

fn storage_failure(event: &str, id: Option<&str>, err: RepoError) -> QuizServiceError {
    error!(
        "event={} module=service status=error id={} error={}",
        event,
        id.unwrap_or("-"),
        err
    );
    QuizServiceError::Storage(err)
}

#[cfg(test)]
mod tests {
    use super::{QuizService, QuizServiceError};
    use crate::db::DbError;
    use crate::model::quiz::Quiz;
    use crate::model::validation::{NewQuiz, QuizPatch};
    use crate::repo::quiz_repo::{QuizRepository, RepoError, RepoResult};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryRepo {
        records: RefCell<HashMap<String, Quiz>>,
        next_id: RefCell<u32>,
    }

    impl QuizRepository for MemoryRepo {
        fn get_by_id(&self, id: &str) -> RepoResult<Option<Quiz>> {
            Ok(self.records.borrow().get(id).cloned())
        }

        fn create(&self, mut quiz: Quiz) -> RepoResult<Quiz> {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            let id = format!("quiz-{next_id}");
            quiz.id = Some(id.clone());
            self.records.borrow_mut().insert(id, quiz.clone());
            Ok(quiz)
        }

        fn replace(&self, id: &str, quiz: Quiz) -> RepoResult<Option<Quiz>> {
            let mut records = self.records.borrow_mut();
            match records.get_mut(id) {
                Some(slot) => {
                    *slot = quiz.clone();
                    Ok(Some(quiz))
                }
                None => Ok(None),
            }
        }

        fn delete(&self, id: &str) -> RepoResult<bool> {
            Ok(self.records.borrow_mut().remove(id).is_some())
        }
    }

    struct BrokenRepo;

    impl QuizRepository for BrokenRepo {
        fn get_by_id(&self, _id: &str) -> RepoResult<Option<Quiz>> {
            Err(RepoError::Db(DbError::Sqlite(
                rusqlite::Error::InvalidQuery,
            )))
        }

        fn create(&self, _quiz: Quiz) -> RepoResult<Quiz> {
            Err(RepoError::InvalidData("disk full".to_string()))
        }

        fn replace(&self, _id: &str, _quiz: Quiz) -> RepoResult<Option<Quiz>> {
            Err(RepoError::InvalidData("disk full".to_string()))
        }

        fn delete(&self, _id: &str) -> RepoResult<bool> {
            Err(RepoError::InvalidData("disk full".to_string()))
        }
    }

    /// Sees the stored record but loses the race to a concurrent delete.
    #[derive(Default)]
    struct DeletedDuringUpdateRepo {
        inner: MemoryRepo,
    }

    impl QuizRepository for DeletedDuringUpdateRepo {
        fn get_by_id(&self, id: &str) -> RepoResult<Option<Quiz>> {
            self.inner.get_by_id(id)
        }

        fn create(&self, quiz: Quiz) -> RepoResult<Quiz> {
            self.inner.create(quiz)
        }

        fn replace(&self, id: &str, _quiz: Quiz) -> RepoResult<Option<Quiz>> {
            self.inner.delete(id)?;
            Ok(None)
        }

        fn delete(&self, id: &str) -> RepoResult<bool> {
            self.inner.delete(id)
        }
    }

    fn capital_of_france() -> NewQuiz {
        NewQuiz {
            question: "What is the capital of France?".to_string(),
            options: vec!["Paris".to_string(), "Lyon".to_string()],
            correct_answer: 0,
            category: "Geography".to_string(),
            difficulty: "Easy".to_string(),
        }
    }

    #[test]
    fn create_assigns_id_and_get_returns_same_record() {
        let service = QuizService::new(MemoryRepo::default());

        let created = service.create(capital_of_france()).unwrap();
        assert_eq!(created.id, "quiz-1");

        let loaded = service.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn invalid_create_never_reaches_repository() {
        let service = QuizService::new(BrokenRepo);
        let mut input = capital_of_france();
        input.correct_answer = 2;

        let err = service.create(input).unwrap_err();
        assert!(matches!(err, QuizServiceError::Validation(_)));
    }

    #[test]
    fn storage_failures_are_wrapped() {
        let service = QuizService::new(BrokenRepo);

        let create_err = service.create(capital_of_france()).unwrap_err();
        assert!(matches!(create_err, QuizServiceError::Storage(_)));

        let get_err = service.get_by_id("quiz-1").unwrap_err();
        assert!(matches!(get_err, QuizServiceError::Storage(_)));

        let delete_err = service.delete("quiz-1").unwrap_err();
        assert!(matches!(delete_err, QuizServiceError::Storage(_)));
    }

    #[test]
    fn update_missing_quiz_returns_none() {
        let service = QuizService::new(MemoryRepo::default());
        let patch = QuizPatch {
            difficulty: Some("Hard".to_string()),
            ..QuizPatch::default()
        };

        assert!(service.update("quiz-404", patch).unwrap().is_none());
    }

    #[test]
    fn update_returns_none_when_replace_modifies_nothing() {
        let service = QuizService::new(DeletedDuringUpdateRepo::default());
        let created = service.create(capital_of_france()).unwrap();
        assert!(service.get_by_id(&created.id).unwrap().is_some());

        let patch = QuizPatch {
            difficulty: Some("Hard".to_string()),
            ..QuizPatch::default()
        };
        assert!(service.update(&created.id, patch).unwrap().is_none());
    }

    #[test]
    fn rejected_update_keeps_stored_record() {
        let service = QuizService::new(MemoryRepo::default());
        let created = service.create(capital_of_france()).unwrap();

        let patch = QuizPatch {
            difficulty: Some("medium".to_string()),
            ..QuizPatch::default()
        };
        let err = service.update(&created.id, patch).unwrap_err();
        assert!(matches!(err, QuizServiceError::Validation(ref e) if e.has_field("difficulty")));

        let loaded = service.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn delete_twice_reports_false_second_time() {
        let service = QuizService::new(MemoryRepo::default());
        let created = service.create(capital_of_france()).unwrap();

        assert!(service.delete(&created.id).unwrap());
        assert!(!service.delete(&created.id).unwrap());
        assert!(service.get_by_id(&created.id).unwrap().is_none());
    }
}
