//! TOML curriculum loader.
//!
//! Loads the grade → subject → topic tree the learner picks exams from, and
//! validates it for common authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Grade, Topic};

/// The ordered collection of grades offered to the learner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Curriculum {
    /// Find a grade by id or by display label.
    pub fn grade(&self, key: &str) -> Option<&Grade> {
        self.grades.iter().find(|g| g.id == key || g.grade == key)
    }

    /// Find a topic by id in any grade, together with its grade.
    pub fn topic(&self, topic_id: &str) -> Option<(&Grade, &Topic)> {
        self.grades
            .iter()
            .find_map(|g| g.topic(topic_id).map(|t| (g, t)))
    }
}

/// Parse a curriculum file.
pub fn parse_curriculum(path: &Path) -> Result<Curriculum> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read curriculum file: {}", path.display()))?;

    parse_curriculum_str(&content, path)
}

/// Parse a TOML string into a `Curriculum` (useful for testing).
pub fn parse_curriculum_str(content: &str, source_path: &Path) -> Result<Curriculum> {
    let curriculum: Curriculum = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    anyhow::ensure!(
        !curriculum.grades.is_empty(),
        "curriculum has no grades: {}",
        source_path.display()
    );

    Ok(curriculum)
}

/// A warning from curriculum validation.
#[derive(Debug, Clone)]
pub struct CurriculumWarning {
    /// The topic ID (if applicable).
    pub topic_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a curriculum for common issues.
pub fn validate_curriculum(curriculum: &Curriculum) -> Vec<CurriculumWarning> {
    let mut warnings = Vec::new();

    let mut seen_grades = HashSet::new();
    for grade in &curriculum.grades {
        if !seen_grades.insert(&grade.id) {
            warnings.push(CurriculumWarning {
                topic_id: None,
                message: format!("duplicate grade ID: {}", grade.id),
            });
        }
        if grade.topics().next().is_none() {
            warnings.push(CurriculumWarning {
                topic_id: None,
                message: format!("grade '{}' has no topics", grade.grade),
            });
        }
    }

    // Topic ids must be unique across the whole curriculum, since the CLI
    // and session look topics up by id alone.
    let mut seen_topics = HashSet::new();
    for topic in curriculum.grades.iter().flat_map(|g| g.topics()) {
        if !seen_topics.insert(&topic.id) {
            warnings.push(CurriculumWarning {
                topic_id: Some(topic.id.clone()),
                message: format!("duplicate topic ID: {}", topic.id),
            });
        }
        if topic.title.trim().is_empty() {
            warnings.push(CurriculumWarning {
                topic_id: Some(topic.id.clone()),
                message: "title is empty".into(),
            });
        }
        if topic.content.trim().is_empty() {
            warnings.push(CurriculumWarning {
                topic_id: Some(topic.id.clone()),
                message: "content is empty; exams will be generated without context".into(),
            });
        }
    }

    warnings
}
