//! Quiz domain model.
//!
//! # Responsibility
//! - Define the canonical multiple-choice question record.
//! - Provide the closed `Difficulty` set with exact-name parsing.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one and never changes afterwards.
//! - `created_at` is set once; `updated_at` moves forward on every write.
//! - Timestamps carry millisecond precision so they survive storage unchanged.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque store-assigned identifier.
pub type QuizId = String;

/// Closed difficulty set. Parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All accepted values in declaration order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Returns the exact wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Parses an exact name. `"medium"` and `" Easy"` are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str() == value)
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical quiz record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Assigned by the store on insert.
    pub id: Option<QuizId>,
    pub question: String,
    /// Ordered answer options; `correct_answer` indexes into this list.
    pub options: Vec<String>,
    pub correct_answer: u32,
    pub category: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    /// Returns the text of the correct option.
    ///
    /// `None` only for records that bypassed validation.
    pub fn correct_option(&self) -> Option<&str> {
        usize::try_from(self.correct_answer)
            .ok()
            .and_then(|index| self.options.get(index))
            .map(String::as_str)
    }

    /// Moves `updated_at` to the current time, or one millisecond past its
    /// previous value when the clock has not advanced since.
    pub fn touch(&mut self) {
        self.updated_at = now_utc().max(self.updated_at + Duration::milliseconds(1));
    }
}

/// Current UTC time truncated to milliseconds.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
