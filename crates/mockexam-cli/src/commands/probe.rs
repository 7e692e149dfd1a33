//! The `mockexam probe` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mockexam_core::probe::probe_candidates;
use mockexam_providers::config::load_config_from;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let invoker = config.invoker()?;
    let generation = config.generation_config()?;

    let report = probe_candidates(invoker.as_ref(), &generation.candidates).await;

    let mut table = Table::new();
    table.set_header(vec!["Model", "Status"]);
    for outcome in &report.outcomes {
        table.add_row(vec![
            Cell::new(&outcome.model),
            Cell::new(outcome.error.as_deref().unwrap_or("OK")),
        ]);
    }
    println!("{table}");

    match report.working_model() {
        Some(model) => {
            println!("\nFirst working model: {model}");
            Ok(())
        }
        None => anyhow::bail!(
            "none of the {} candidate models answered",
            generation.candidates.len()
        ),
    }
}
