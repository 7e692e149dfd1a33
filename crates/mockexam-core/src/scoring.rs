//! Exam scoring.
//!
//! A pure function of the problem set and the answer sheet. Unanswered
//! problems count as incorrect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerStore, ChoiceNumber};
use crate::model::{Difficulty, Problem};

/// Correct/total counts for one slice of the exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

/// How one problem was answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemReview {
    pub problem_id: String,
    /// `None` when the learner left the problem blank.
    pub selected: Option<ChoiceNumber>,
    pub correct_choice: ChoiceNumber,
    pub is_correct: bool,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
}

/// Result of scoring a submitted exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Number of correctly answered problems.
    pub correct: usize,
    /// Number of problems in the set.
    pub total: usize,
    /// Number of problems with a recorded answer.
    pub answered: usize,
    pub by_difficulty: BTreeMap<Difficulty, Tally>,
    /// One entry per problem, in problem set order.
    pub review: Vec<ProblemReview>,
}

impl ScoreReport {
    /// Score scaled to 100, rounded down; 0 for an empty set.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.correct * 100 / self.total) as u32
    }
}

/// Score `answers` against the answer key of the live problems.
pub fn score(problems: &[Problem], answers: &AnswerStore) -> ScoreReport {
    let mut by_difficulty: BTreeMap<Difficulty, Tally> = BTreeMap::new();
    let mut review = Vec::with_capacity(problems.len());
    let mut correct = 0;
    let mut answered = 0;

    for problem in problems {
        let selected = answers.get(&problem.id);
        let is_correct = selected.is_some_and(|choice| problem.is_correct(choice));

        if selected.is_some() {
            answered += 1;
        }
        if is_correct {
            correct += 1;
        }

        let tally = by_difficulty.entry(problem.difficulty).or_default();
        tally.total += 1;
        if is_correct {
            tally.correct += 1;
        }

        review.push(ProblemReview {
            problem_id: problem.id.clone(),
            selected,
            correct_choice: problem.correct_choice(),
            is_correct,
            difficulty: problem.difficulty,
            explanation: problem.explanation.clone(),
        });
    }

    ScoreReport {
        correct,
        total: problems.len(),
        answered,
        by_difficulty,
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::assemble_problem_set;
    use crate::generation::testing::exam_json;
    use crate::model::ProblemSet;
    use crate::parser::parse_problems;

    fn exam(n: usize) -> ProblemSet {
        let drafts = parse_problems(&exam_json(n), 1).unwrap();
        assemble_problem_set(drafts, "중학교 3학년", "운동과 에너지", "m")
    }

    fn choice(n: u32) -> ChoiceNumber {
        ChoiceNumber::new(n).unwrap()
    }

    #[test]
    fn empty_sheet_scores_zero() {
        let set = exam(40);
        let answers = AnswerStore::for_problems(&set.problems);
        let report = score(&set.problems, &answers);
        assert_eq!(report.correct, 0);
        assert_eq!(report.total, 40);
        assert_eq!(report.answered, 0);
        assert_eq!(report.percentage(), 0);
        assert!(report.review.iter().all(|r| r.selected.is_none()));
    }

    #[test]
    fn answer_index_law() {
        let set = exam(10);
        for problem in &set.problems {
            for n in 1..=problem.choices.len() as u32 {
                let mut answers = AnswerStore::for_problems(&set.problems);
                answers.set(&problem.id, choice(n)).unwrap();
                let report = score(&set.problems, &answers);
                let expected = n as usize == problem.answer + 1;
                assert_eq!(report.correct, usize::from(expected), "choice {n}");
            }
        }
    }

    #[test]
    fn zero_based_comparison_would_be_wrong() {
        let set = exam(5);
        let first = &set.problems[0];
        assert_eq!(first.answer, 2);

        let mut answers = AnswerStore::for_problems(&set.problems);
        answers.set(&first.id, choice(2)).unwrap();
        assert_eq!(score(&set.problems, &answers).correct, 0);

        answers.set(&first.id, choice(3)).unwrap();
        assert_eq!(score(&set.problems, &answers).correct, 1);
    }

    #[test]
    fn perfect_sheet_scores_total() {
        let set = exam(40);
        let mut answers = AnswerStore::for_problems(&set.problems);
        for p in &set.problems {
            answers.set(&p.id, p.correct_choice()).unwrap();
        }
        let report = score(&set.problems, &answers);
        assert_eq!(report.correct, 40);
        assert_eq!(report.percentage(), 100);
        let total: usize = report.by_difficulty.values().map(|t| t.total).sum();
        assert_eq!(total, 40);
        assert!(report.by_difficulty.values().all(|t| t.correct == t.total));
    }

    #[test]
    fn scoring_is_deterministic_and_bounded() {
        let set = exam(40);
        let mut answers = AnswerStore::for_problems(&set.problems);
        for (i, p) in set.problems.iter().enumerate() {
            answers.set(&p.id, choice((i % 5) as u32 + 1)).unwrap();
        }
        let a = score(&set.problems, &answers);
        let b = score(&set.problems, &answers);
        assert_eq!(a, b);
        assert!(a.correct <= a.total);
        assert_eq!(a.answered, 40);
    }

    #[test]
    fn percentage_rounds_down() {
        let set = exam(3);
        let mut answers = AnswerStore::for_problems(&set.problems);
        answers
            .set(&set.problems[0].id, set.problems[0].correct_choice())
            .unwrap();
        assert_eq!(score(&set.problems, &answers).percentage(), 33);
    }

    #[test]
    fn review_carries_explanations() {
        let set = exam(5);
        let answers = AnswerStore::for_problems(&set.problems);
        let report = score(&set.problems, &answers);
        assert_eq!(report.review.len(), 5);
        assert_eq!(report.review[0].correct_choice, choice(3));
        assert_eq!(report.review[0].explanation.as_deref(), Some("해설 1"));
    }
}
