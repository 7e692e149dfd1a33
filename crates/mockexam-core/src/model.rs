//! Core data model types for mockexam.
//!
//! Curriculum types (`Grade`, `Subject`, `Topic`) are consumed read-only.
//! `Problem` and `ProblemSet` are produced only by the generation service and
//! are immutable once built.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::{choice_number_for, ChoiceNumber};

/// Context sent to the generator when a topic has no content.
pub const MISSING_CONTEXT: &str = "Context not available.";

/// A school grade with its subjects, e.g. "중학교 1학년".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: String,
    /// Display label, also sent to the generator.
    pub grade: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Grade {
    /// All topics of this grade, in subject order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.subjects.iter().flat_map(|s| s.topics.iter())
    }

    /// Find a topic by id.
    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// One curriculum topic. Only `title` and `content` reach the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    /// Free-text study material used as generation context.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_reference: Option<String>,
}

impl Topic {
    /// The generation context for this topic.
    pub fn context(&self) -> &str {
        if self.content.trim().is_empty() {
            MISSING_CONTEXT
        } else {
            &self.content
        }
    }
}

/// Difficulty label of a generated problem.
///
/// Generators label difficulty either in English or with the Korean
/// 하/중/상 scale; both deserialize to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "하", alias = "Easy", alias = "EASY")]
    Easy,
    #[serde(alias = "중", alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "상", alias = "Hard", alias = "HARD")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "하" => Ok(Difficulty::Easy),
            "medium" | "중" => Ok(Difficulty::Medium),
            "hard" | "상" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single multiple-choice problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique within its problem set.
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub passage: Option<String>,
    /// At least two choices, usually five.
    pub choices: Vec<String>,
    /// Zero-based index of the correct choice.
    pub answer: usize,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Grade label of the request that produced this problem.
    pub grade: String,
    /// Topic title of the request that produced this problem.
    pub topic: String,
}

impl Problem {
    /// The one-based choice number a learner must pick to be correct.
    pub fn correct_choice(&self) -> ChoiceNumber {
        choice_number_for(self.answer)
    }

    /// Whether `selected` is the correct choice.
    pub fn is_correct(&self, selected: ChoiceNumber) -> bool {
        selected == self.correct_choice()
    }
}

/// The complete generated exam for one grade/topic pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSet {
    pub id: Uuid,
    pub grade: String,
    pub topic_title: String,
    /// Candidate model that produced the set.
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub problems: Vec<Problem>,
}

impl ProblemSet {
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Easy.to_string(), "easy");
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("상".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn difficulty_deserializes_korean_labels() {
        let d: Vec<Difficulty> = serde_json::from_str(r#"["하", "중", "상", "easy"]"#).unwrap();
        assert_eq!(
            d,
            vec![
                Difficulty::Easy,
                Difficulty::Medium,
                Difficulty::Hard,
                Difficulty::Easy
            ]
        );
    }

    #[test]
    fn topic_context_falls_back_when_empty() {
        let topic = Topic {
            id: "t1".into(),
            title: "물질의 구성".into(),
            content: "   ".into(),
            video_reference: None,
        };
        assert_eq!(topic.context(), MISSING_CONTEXT);
    }

    #[test]
    fn grade_topics_flatten_subjects() {
        let topic = |id: &str| Topic {
            id: id.into(),
            title: id.into(),
            content: String::new(),
            video_reference: None,
        };
        let grade = Grade {
            id: "g1".into(),
            grade: "중학교 1학년".into(),
            subjects: vec![
                Subject {
                    id: "physics".into(),
                    title: "물리".into(),
                    topics: vec![topic("force")],
                },
                Subject {
                    id: "chemistry".into(),
                    title: "화학".into(),
                    topics: vec![topic("matter"), topic("reaction")],
                },
            ],
        };
        let ids: Vec<&str> = grade.topics().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["force", "matter", "reaction"]);
        assert!(grade.topic("reaction").is_some());
        assert!(grade.topic("missing").is_none());
    }

    #[test]
    fn problem_correct_choice_is_one_based() {
        let problem = Problem {
            id: "p1".into(),
            question: "q".into(),
            passage: None,
            choices: vec!["a".into(), "b".into(), "c".into()],
            answer: 2,
            difficulty: Difficulty::Easy,
            explanation: None,
            grade: "g".into(),
            topic: "t".into(),
        };
        assert_eq!(problem.correct_choice().get(), 3);
        assert!(problem.is_correct(ChoiceNumber::new(3).unwrap()));
        assert!(!problem.is_correct(ChoiceNumber::new(2).unwrap()));
    }
}
