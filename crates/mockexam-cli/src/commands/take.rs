//! The `mockexam take` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use mockexam_core::curriculum::parse_curriculum;
use mockexam_core::model::{Problem, ProblemSet};
use mockexam_core::{ExamSession, ProblemGenerationService, ScoreReport};
use mockexam_providers::config::load_config_from;

pub async fn execute(
    curriculum_path: PathBuf,
    grade_key: String,
    topic_id: String,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let curriculum = parse_curriculum(&curriculum_path)?;
    let grade = curriculum
        .grade(&grade_key)
        .with_context(|| format!("grade not found in curriculum: {grade_key}"))?;
    let topic = match grade.topic(&topic_id) {
        Some(topic) => topic.clone(),
        None => match curriculum.topic(&topic_id) {
            Some((owner, _)) => anyhow::bail!(
                "topic '{topic_id}' not found in grade '{}' (it belongs to '{}')",
                grade.grade,
                owner.grade
            ),
            None => anyhow::bail!("topic '{topic_id}' not found in grade '{}'", grade.grade),
        },
    };

    let config = load_config_from(config_path.as_deref())?;
    let service = ProblemGenerationService::new(config.invoker()?, config.generation_config()?);
    let mut session = ExamSession::new(Arc::new(service));

    session.select_grade(grade.grade.clone())?;
    eprintln!(
        "Generating {} questions on '{}' ({})...",
        config.question_count, topic.title, grade.grade
    );
    session
        .select_topic(topic)
        .await
        .context("could not generate an exam")?;

    // With --json, stdout carries only the report.
    let mut out: Box<dyn Write> = if json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    if let Some(set) = session.problem_set() {
        writeln!(
            out,
            "\n{}: {} problems (model: {})\n",
            set.topic_title,
            set.len(),
            set.model
        )?;
    }

    let problems: Vec<Problem> = session.problems().to_vec();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    for (n, problem) in problems.iter().enumerate() {
        print_problem(&mut out, n + 1, problem)?;
        write!(out, "Answer (1-{}, empty to skip): ", problem.choices.len())?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<u32>() {
            Ok(choice) => {
                if let Err(e) = session.answer(&problem.id, choice) {
                    eprintln!("  {e}; left unanswered");
                }
            }
            Err(_) => eprintln!("  '{line}' is not a choice number; left unanswered"),
        }
    }

    let (answered, total) = session.progress();
    tracing::debug!(answered, total, "submitting");
    let report = session.submit()?.clone();

    match session.problem_set() {
        Some(set) if json => print_json(set, &report)?,
        _ => print_report(&report),
    }

    Ok(())
}

fn print_problem(out: &mut dyn Write, number: usize, problem: &Problem) -> io::Result<()> {
    writeln!(out, "{number}. [{}] {}", problem.difficulty, problem.question)?;
    if let Some(passage) = &problem.passage {
        for line in passage.lines() {
            writeln!(out, "   | {line}")?;
        }
    }
    for (i, choice) in problem.choices.iter().enumerate() {
        writeln!(out, "   {}) {choice}", i + 1)?;
    }
    Ok(())
}

fn print_json(set: &ProblemSet, report: &ScoreReport) -> Result<()> {
    let value = serde_json::json!({
        "problem_set_id": set.id,
        "grade": set.grade,
        "topic": set.topic_title,
        "model": set.model,
        "percentage": report.percentage(),
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_report(report: &ScoreReport) {
    println!(
        "\nScore: {}/{} ({}%), {} answered",
        report.correct,
        report.total,
        report.percentage(),
        report.answered
    );

    let mut by_difficulty = Table::new();
    by_difficulty.set_header(vec!["Difficulty", "Correct", "Total"]);
    for (difficulty, tally) in &report.by_difficulty {
        by_difficulty.add_row(vec![
            Cell::new(difficulty),
            Cell::new(tally.correct),
            Cell::new(tally.total),
        ]);
    }
    println!("\n{by_difficulty}");

    let mut review = Table::new();
    review.set_header(vec!["#", "Your answer", "Correct", "Result", "Explanation"]);
    for (n, item) in report.review.iter().enumerate() {
        review.add_row(vec![
            Cell::new(n + 1),
            Cell::new(
                item.selected
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(item.correct_choice),
            Cell::new(if item.is_correct { "O" } else { "X" }),
            Cell::new(item.explanation.as_deref().unwrap_or("")),
        ]);
    }
    println!("\n{review}");
}
