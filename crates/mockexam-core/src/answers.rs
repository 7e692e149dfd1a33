//! The learner's answer sheet.
//!
//! The answer sheet numbers choices from 1 while generators encode the correct
//! answer as a zero-based index. [`choice_number_for`] is the one place the two
//! index spaces meet; scoring and display both go through it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnswerError;
use crate::model::Problem;

/// A one-based choice number as printed on the answer sheet (①, ②, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChoiceNumber(u32);

impl ChoiceNumber {
    /// Returns `None` for 0, which is not a valid choice number.
    pub fn new(number: u32) -> Option<Self> {
        (number >= 1).then_some(Self(number))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The zero-based choice index this number refers to.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u32> for ChoiceNumber {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ChoiceNumber::new(value).ok_or_else(|| "choice numbers start at 1".to_string())
    }
}

impl From<ChoiceNumber> for u32 {
    fn from(c: ChoiceNumber) -> u32 {
        c.0
    }
}

impl fmt::Display for ChoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert a generator's zero-based answer index to the answer sheet's
/// one-based choice number.
pub fn choice_number_for(answer_index: usize) -> ChoiceNumber {
    ChoiceNumber(answer_index as u32 + 1)
}

/// Answers keyed by problem id, restricted to the problems of one live set.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    /// Number of choices per addressable problem id.
    choice_counts: HashMap<String, usize>,
    answers: HashMap<String, ChoiceNumber>,
    sealed: bool,
}

impl AnswerStore {
    /// An empty answer sheet addressing exactly the given problems.
    pub fn for_problems(problems: &[Problem]) -> Self {
        Self {
            choice_counts: problems
                .iter()
                .map(|p| (p.id.clone(), p.choices.len()))
                .collect(),
            answers: HashMap::new(),
            sealed: false,
        }
    }

    /// Record or overwrite the choice for a problem.
    ///
    /// Rejected once the sheet is sealed, for unknown problem ids and for
    /// choice numbers beyond the problem's choices. A rejected call leaves
    /// the sheet unchanged.
    pub fn set(&mut self, problem_id: &str, choice: ChoiceNumber) -> Result<(), AnswerError> {
        if self.sealed {
            return Err(AnswerError::Sealed);
        }
        let Some(&choices) = self.choice_counts.get(problem_id) else {
            return Err(AnswerError::UnknownProblem(problem_id.to_string()));
        };
        if choice.index() >= choices {
            return Err(AnswerError::ChoiceOutOfRange {
                problem_id: problem_id.to_string(),
                choice: choice.get(),
                choices,
            });
        }
        self.answers.insert(problem_id.to_string(), choice);
        Ok(())
    }

    /// The recorded choice, or `None` if unanswered.
    pub fn get(&self, problem_id: &str) -> Option<ChoiceNumber> {
        self.answers.get(problem_id).copied()
    }

    /// Remove every recorded answer and forget the addressable problems.
    pub fn clear(&mut self) {
        self.choice_counts.clear();
        self.answers.clear();
        self.sealed = false;
    }

    /// Freeze the sheet; every later `set` is rejected.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of answered problems.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
