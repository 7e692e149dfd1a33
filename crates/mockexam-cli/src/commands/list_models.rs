//! The `mockexam list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use mockexam_providers::config::load_config_from;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let invoker = config.invoker()?;

    let models = invoker.list_models().await?;
    if models.is_empty() {
        println!("Endpoint '{}' reports no generation models.", invoker.name());
        return Ok(());
    }

    println!("Provider: {}", invoker.name());
    for model in &models {
        let marker = if config.candidate_models.contains(model) {
            " (candidate)"
        } else {
            ""
        };
        println!("  {model}{marker}");
    }

    Ok(())
}
