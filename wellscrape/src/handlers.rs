use anyhow::{Context, Result};
use tracing::info;
use wellscrape_core::rules::Rule;
use wellscrape_core::{Pipeline, RunSummary, ScraperConfig, default_rules};

/// One full run over every report.
pub async fn run(config: ScraperConfig) -> Result<RunSummary> {
    run_rules(config, &default_rules()).await
}

pub async fn run_rules(config: ScraperConfig, rules: &[Box<dyn Rule>]) -> Result<RunSummary> {
    info!(
        "Starting run against {} into {}",
        config.base_url,
        config.data_root.display()
    );
    let pipeline = Pipeline::from_config(config).context("Failed to set up the HTTP client")?;
    let summary = pipeline
        .run(rules)
        .await
        .context("Run stopped")?;
    info!(
        "Finished: {} documents saved, {} skipped, {} of {} reports abandoned",
        summary.total_saved(),
        summary.total_skipped(),
        summary.aborted_rules(),
        summary.rules.len()
    );
    Ok(summary)
}
