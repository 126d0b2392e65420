//! Creation validation and partial-update merge for quizzes.
//!
//! # Responsibility
//! - Turn an untrusted `NewQuiz` payload into a valid `Quiz`.
//! - Merge an untrusted `QuizPatch` into an existing `Quiz`.
//! - Report every violated rule at once as a list of field errors.
//!
//! # Invariants
//! - Neither operation touches storage.
//! - A failed merge leaves the existing record untouched.
//! - The answer index is always checked against the options list the
//!   record will hold after the write, not the one it held before.

use crate::model::quiz::{now_utc, Difficulty, Quiz};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

pub const QUESTION_CHARS: RangeInclusive<usize> = 5..=500;
pub const OPTION_COUNT: RangeInclusive<usize> = 2..=6;
pub const CORRECT_ANSWER_BOUNDS: RangeInclusive<i64> = 0..=5;
pub const CATEGORY_CHARS: RangeInclusive<usize> = 2..=100;

const QUESTION_LENGTH_MESSAGE: &str = "Question must be between 5 and 500 characters";
const TOO_FEW_OPTIONS_MESSAGE: &str = "At least 2 options are required";
const TOO_MANY_OPTIONS_MESSAGE: &str = "Maximum 6 options allowed";
const ANSWER_BOUNDS_MESSAGE: &str = "Correct answer index must be between 0 and 5";
const ANSWER_OUT_OF_RANGE_MESSAGE: &str =
    "Correct answer index is out of range for the provided options.";
const CATEGORY_LENGTH_MESSAGE: &str = "Category must be between 2 and 100 characters";
const DIFFICULTY_MESSAGE: &str = "Difficulty must be Easy, Medium, or Hard";

/// One violated rule, tied to the camelCase field name it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Non-empty list of rule violations for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizValidationError {
    errors: Vec<FieldError>,
}

impl QuizValidationError {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Human-readable messages in the order the rules were checked.
    pub fn messages(&self) -> Vec<&'static str> {
        self.errors.iter().map(|error| error.message).collect()
    }

    /// Returns whether any error concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

impl Display for QuizValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self.messages();
        write!(f, "invalid quiz: {}", messages.join("; "))
    }
}

impl Error for QuizValidationError {}

/// Creation payload. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuiz {
    pub question: String,
    pub options: Vec<String>,
    /// Signed so that negative input is reported as a rule violation.
    pub correct_answer: i64,
    pub category: String,
    /// Raw text so that an unknown value is reported as a rule violation.
    pub difficulty: String,
}

impl NewQuiz {
    /// Validates every field and builds an unsaved `Quiz`.
    ///
    /// # Errors
    /// - Returns all violated rules when any field is out of bounds, the
    ///   answer index does not reference an option, or the difficulty is
    ///   not an exact member of the closed set.
    pub fn validate(self) -> Result<Quiz, QuizValidationError> {
        let mut errors = Vec::new();

        check_question(&self.question, &mut errors);
        check_options(&self.options, &mut errors);
        let correct_answer =
            check_correct_answer(self.correct_answer, self.options.len(), &mut errors);
        check_category(&self.category, &mut errors);
        let difficulty = check_difficulty(&self.difficulty, &mut errors);

        match (correct_answer, difficulty) {
            (Some(correct_answer), Some(difficulty)) if errors.is_empty() => {
                let now = now_utc();
                Ok(Quiz {
                    id: None,
                    question: self.question,
                    options: self.options,
                    correct_answer,
                    category: self.category,
                    difficulty,
                    created_at: now,
                    updated_at: now,
                })
            }
            _ => Err(QuizValidationError { errors }),
        }
    }
}

/// Partial-update payload. Absent fields keep their stored value.
///
/// Blank text and an empty options list count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizPatch {
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<i64>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

impl QuizPatch {
    /// Applies this patch to `existing` and advances `updated_at`.
    ///
    /// Options are resolved before the answer index is checked, so a
    /// retained index is re-validated when the options list shrinks.
    ///
    /// # Errors
    /// - Returns all violated rules; `existing` is consumed either way, so
    ///   callers that need it after a failure must clone first.
    pub fn merge_into(self, existing: Quiz) -> Result<Quiz, QuizValidationError> {
        let mut errors = Vec::new();

        let question = non_blank(self.question);
        if let Some(question) = &question {
            check_question(question, &mut errors);
        }

        let options = self.options.filter(|options| !options.is_empty());
        if let Some(options) = &options {
            check_options(options, &mut errors);
        }
        let final_option_count = options.as_ref().map_or(existing.options.len(), Vec::len);

        let correct_answer = match self.correct_answer {
            Some(requested) => check_correct_answer(requested, final_option_count, &mut errors),
            None => {
                if options.is_some() {
                    check_correct_answer(
                        i64::from(existing.correct_answer),
                        final_option_count,
                        &mut errors,
                    );
                }
                None
            }
        };

        let category = non_blank(self.category);
        if let Some(category) = &category {
            check_category(category, &mut errors);
        }

        let difficulty = non_blank(self.difficulty)
            .and_then(|difficulty| check_difficulty(&difficulty, &mut errors));

        if !errors.is_empty() {
            return Err(QuizValidationError { errors });
        }

        let mut quiz = existing;
        if let Some(question) = question {
            quiz.question = question;
        }
        if let Some(options) = options {
            quiz.options = options;
        }
        if let Some(correct_answer) = correct_answer {
            quiz.correct_answer = correct_answer;
        }
        if let Some(category) = category {
            quiz.category = category;
        }
        if let Some(difficulty) = difficulty {
            quiz.difficulty = difficulty;
        }
        quiz.touch();

        Ok(quiz)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn check_question(question: &str, errors: &mut Vec<FieldError>) {
    if !QUESTION_CHARS.contains(&question.chars().count()) {
        errors.push(FieldError {
            field: "question",
            message: QUESTION_LENGTH_MESSAGE,
        });
    }
}

fn check_options(options: &[String], errors: &mut Vec<FieldError>) {
    let message = if options.len() < *OPTION_COUNT.start() {
        TOO_FEW_OPTIONS_MESSAGE
    } else if options.len() > *OPTION_COUNT.end() {
        TOO_MANY_OPTIONS_MESSAGE
    } else {
        return;
    };
    errors.push(FieldError {
        field: "options",
        message,
    });
}

fn check_correct_answer(
    requested: i64,
    option_count: usize,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    if !CORRECT_ANSWER_BOUNDS.contains(&requested) {
        errors.push(FieldError {
            field: "correctAnswer",
            message: ANSWER_BOUNDS_MESSAGE,
        });
        return None;
    }

    match usize::try_from(requested) {
        Ok(index) if index < option_count => u32::try_from(requested).ok(),
        _ => {
            errors.push(FieldError {
                field: "correctAnswer",
                message: ANSWER_OUT_OF_RANGE_MESSAGE,
            });
            None
        }
    }
}

fn check_category(category: &str, errors: &mut Vec<FieldError>) {
    if !CATEGORY_CHARS.contains(&category.chars().count()) {
        errors.push(FieldError {
            field: "category",
            message: CATEGORY_LENGTH_MESSAGE,
        });
    }
}

fn check_difficulty(difficulty: &str, errors: &mut Vec<FieldError>) -> Option<Difficulty> {
    let parsed = Difficulty::parse(difficulty);
    if parsed.is_none() {
        errors.push(FieldError {
            field: "difficulty",
            message: DIFFICULTY_MESSAGE,
        });
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::{check_correct_answer, non_blank, FieldError, ANSWER_OUT_OF_RANGE_MESSAGE};

    #[test]
    fn non_blank_treats_whitespace_as_absent() {
        assert_eq!(non_blank(Some("   \t".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" Math ".to_string())), Some(" Math ".to_string()));
    }

    #[test]
    fn answer_index_must_reference_an_option_even_inside_bounds() {
        let mut errors: Vec<FieldError> = Vec::new();
        assert_eq!(check_correct_answer(1, 2, &mut errors), Some(1));
        assert!(errors.is_empty());

        assert_eq!(check_correct_answer(2, 2, &mut errors), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, ANSWER_OUT_OF_RANGE_MESSAGE);
    }

    #[test]
    fn answer_index_outside_bounds_reports_single_error() {
        let mut errors: Vec<FieldError> = Vec::new();
        assert_eq!(check_correct_answer(-1, 6, &mut errors), None);
        assert_eq!(check_correct_answer(6, 6, &mut errors), None);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|error| error.field == "correctAnswer"));
    }
}
