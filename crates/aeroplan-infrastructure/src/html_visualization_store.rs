//! HtmlVisualizationStore - Writes graph views as standalone vis-network pages.
//!
//! Files are named `graph_<hex>.html` inside the static directory and are
//! referenced by callers through `<url_prefix>/<file>`.

use aeroplan_core::config::ArtifactConfig;
use aeroplan_core::graph::GraphView;
use aeroplan_core::visualization::{VisualizationHandle, VisualizationStore};
use aeroplan_core::Result;
use async_trait::async_trait;
use minijinja::{Environment, context};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

const GRAPH_TEMPLATE_NAME: &str = "graph.html";
const GRAPH_TEMPLATE: &str = include_str!("templates/graph.html");

const FILE_PREFIX: &str = "graph_";
const FILE_SUFFIX: &str = ".html";

/// Outcome of a stale artifact sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Visualization store writing HTML files to a static directory.
#[derive(Debug, Clone)]
pub struct HtmlVisualizationStore {
    static_dir: PathBuf,
    url_prefix: String,
}

impl HtmlVisualizationStore {
    pub fn new(static_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            static_dir: static_dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ArtifactConfig) -> Self {
        Self::new(config.static_dir.clone(), config.static_url_prefix.clone())
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// Local file backing a handle.
    pub fn artifact_path(&self, handle: &VisualizationHandle) -> PathBuf {
        self.static_dir.join(handle.file_name())
    }

    /// Deletes `graph_*.html` files whose modification time is older than `max_age`.
    ///
    /// Best effort: unreadable entries and failed deletions are logged and
    /// counted, never returned as errors. A missing directory is an empty sweep.
    pub async fn sweep_stale(&self, max_age: Duration) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        let mut entries = match tokio::fs::read_dir(&self.static_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(err) => return Err(err.into()),
        };

        let now = SystemTime::now();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_graph_file(name) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(err) => {
                    tracing::warn!("[HtmlVisualizationStore] Cannot stat {}: {}", name, err);
                    report.failed += 1;
                    continue;
                }
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => report.removed += 1,
                Err(err) => {
                    tracing::warn!("[HtmlVisualizationStore] Delete graph failed {}: {}", name, err);
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 {
            tracing::info!(
                "[HtmlVisualizationStore] Swept {} stale graph file(s)",
                report.removed
            );
        }
        Ok(report)
    }
}

#[async_trait]
impl VisualizationStore for HtmlVisualizationStore {
    async fn save(&self, view: &GraphView) -> Result<VisualizationHandle> {
        let html = render_graph_html(view)?;

        tokio::fs::create_dir_all(&self.static_dir).await?;
        let file_name = format!("{}{}{}", FILE_PREFIX, Uuid::new_v4().simple(), FILE_SUFFIX);
        let path = self.static_dir.join(&file_name);
        tokio::fs::write(&path, html).await?;

        tracing::debug!(
            "[HtmlVisualizationStore] Wrote {} ({} nodes, {} edges)",
            path.display(),
            view.nodes().len(),
            view.edges().len()
        );
        Ok(VisualizationHandle::new(format!("{}/{}", self.url_prefix, file_name)))
    }
}

fn is_graph_file(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

/// JSON for embedding inside a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn render_graph_html(view: &GraphView) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(GRAPH_TEMPLATE_NAME, GRAPH_TEMPLATE)?;
    let template = env.get_template(GRAPH_TEMPLATE_NAME)?;

    let nodes = script_json(view.nodes())?;
    let edges = script_json(view.edges())?;
    Ok(template.render(context! { nodes => nodes, edges => edges })?)
}
