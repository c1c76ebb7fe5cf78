use aeroplan_core::config::AppConfig;
use aeroplan_infrastructure::HtmlVisualizationStore;
use anyhow::Result;
use colored::Colorize;
use std::time::Duration;

pub async fn run(config: AppConfig) -> Result<()> {
    let store = HtmlVisualizationStore::from_config(&config.artifacts);
    let report = store
        .sweep_stale(Duration::from_secs(config.artifacts.retention_secs))
        .await?;

    println!(
        "{}",
        format!(
            "Removed {} stale graph file(s) from {}",
            report.removed,
            store.static_dir().display()
        )
        .green()
    );
    if report.failed > 0 {
        println!(
            "{}",
            format!("{} file(s) could not be removed", report.failed).yellow()
        );
    }
    Ok(())
}
