//! The `mockexam validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_core::curriculum::{parse_curriculum, validate_curriculum};

pub fn execute(curriculum_path: PathBuf) -> Result<()> {
    let curriculum = parse_curriculum(&curriculum_path)?;

    let topic_count: usize = curriculum.grades.iter().map(|g| g.topics().count()).sum();
    println!(
        "Curriculum: {} ({} grades, {} topics)",
        curriculum_path.display(),
        curriculum.grades.len(),
        topic_count
    );

    let warnings = validate_curriculum(&curriculum);
    for w in &warnings {
        let prefix = w
            .topic_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Curriculum valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
