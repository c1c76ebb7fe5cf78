//! Wiring of concrete adapters into the orchestrator.

use aeroplan_application::{QaOrchestrator, ResponseChunk};
use aeroplan_core::config::AppConfig;
use aeroplan_core::session::SharedSession;
use aeroplan_core::visualization::VisualizationHandle;
use aeroplan_infrastructure::{ConfigService, CsvPlanStore, HtmlVisualizationStore};
use aeroplan_interaction::{Neo4jHttpStore, OpenAiApiClient};
use anyhow::{Context, Result};
use colored::Colorize;
use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub async fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    ConfigService::new(path)
        .load()
        .await
        .context("Failed to load configuration")
}

/// Everything a question-answering command needs.
pub struct App {
    pub config: AppConfig,
    pub orchestrator: QaOrchestrator,
    pub visualizations: Arc<HtmlVisualizationStore>,
}

impl App {
    pub fn build(config: AppConfig) -> Result<Self> {
        let llm = Arc::new(
            OpenAiApiClient::from_config(&config.llm).context("LLM client is not configured")?,
        );
        let store = Arc::new(Neo4jHttpStore::from_config(&config.graph));
        let visualizations = Arc::new(HtmlVisualizationStore::from_config(&config.artifacts));
        let plans = Arc::new(CsvPlanStore::from_config(&config.artifacts));

        let orchestrator =
            QaOrchestrator::from_config(&config, llm, store, visualizations.clone(), plans);
        Ok(Self {
            config,
            orchestrator,
            visualizations,
        })
    }

    /// Removes graph files older than the configured retention.
    pub async fn sweep(&self) {
        let retention = Duration::from_secs(self.config.artifacts.retention_secs);
        if let Err(err) = self.visualizations.sweep_stale(retention).await {
            tracing::warn!("Graph sweep failed: {}", err);
        }
    }

    /// Streams one turn to stdout.
    pub async fn answer(&self, question: &str, session: SharedSession) -> Result<()> {
        let mut stream = self.orchestrator.ask(question, session);
        let mut shown: Option<VisualizationHandle> = None;
        let mut stdout = std::io::stdout();

        while let Some(ResponseChunk {
            text,
            visualization,
        }) = stream.next().await
        {
            if let Some(handle) = visualization {
                if shown.as_ref() != Some(&handle) {
                    let path = self.visualizations.artifact_path(&handle);
                    println!(
                        "{}",
                        format!("Graph: {} ({})", handle, path.display()).bright_black()
                    );
                    shown = Some(handle);
                }
            }
            print!("{}", text);
            stdout.flush()?;
        }
        println!();
        Ok(())
    }
}
