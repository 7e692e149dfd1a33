//! The `mockexam topics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mockexam_core::curriculum::parse_curriculum;

pub fn execute(curriculum_path: PathBuf) -> Result<()> {
    let curriculum = parse_curriculum(&curriculum_path)?;

    let mut table = Table::new();
    table.set_header(vec!["Grade", "Subject", "Topic ID", "Title", "Video"]);

    for grade in &curriculum.grades {
        for subject in &grade.subjects {
            for topic in &subject.topics {
                table.add_row(vec![
                    Cell::new(format!("{} ({})", grade.grade, grade.id)),
                    Cell::new(&subject.title),
                    Cell::new(&topic.id),
                    Cell::new(&topic.title),
                    Cell::new(topic.video_reference.as_deref().unwrap_or("-")),
                ]);
            }
        }
    }

    println!("{table}");
    Ok(())
}
