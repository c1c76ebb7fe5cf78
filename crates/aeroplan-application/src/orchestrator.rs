//! QaOrchestrator - Runs one question-answering turn as a chunk stream.
//!
//! A turn moves through `Start -> Routed -> Streaming -> Finalizing -> Done`,
//! with `Failed` reachable from any state. The turn runs on its own task and
//! hands chunks to the caller through a channel of capacity 1, so generation
//! never runs ahead of the consumer by more than one chunk.

use crate::cypher_qa::CypherQaService;
use crate::router::QueryRouter;
use crate::synthesizer::{DesignSynthesizer, GraphAnswerSynthesizer};
use aeroplan_core::config::AppConfig;
use aeroplan_core::graph::{GraphQueryResult, GraphQueryService, GraphStore, build_graph_view};
use aeroplan_core::llm::{LlmClient, TokenStream};
use aeroplan_core::plan::{AssemblyPlanRecord, PlanRepository, extract_plan_table};
use aeroplan_core::session::SharedSession;
use aeroplan_core::visualization::{VisualizationHandle, VisualizationStore};
use aeroplan_core::{AeroError, Intent};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const NO_TABLE_NOTICE: &str = "\n⚠️ No formatting compliant Markdown table detected, CSV not saved.";
const CSV_FAILED_NOTICE: &str = "\n⚠️ CSV generation failed.";

fn saved_notice(path: &std::path::Path) -> String {
    format!(
        "\n\n✅ **The assembly plan has been saved as a CSV file:** `{}`",
        path.display()
    )
}

fn error_message(err: &AeroError) -> String {
    format!("Sorry, there was an error while processing your question: {err}")
}

/// One unit of streamed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseChunk {
    pub text: String,
    /// Rendered graph for graph-pipeline turns, repeated on every chunk.
    pub visualization: Option<VisualizationHandle>,
}

impl ResponseChunk {
    pub fn new(text: impl Into<String>, visualization: Option<VisualizationHandle>) -> Self {
        Self {
            text: text.into(),
            visualization,
        }
    }
}

/// Ordered chunks of one turn. Ends after the final chunk has been
/// delivered and memory has been updated.
pub type ResponseStream = ReceiverStream<ResponseChunk>;

/// Lifecycle of a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Start,
    Routed(Intent),
    Streaming,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnState::Start => f.write_str("start"),
            TurnState::Routed(intent) => write!(f, "routed({intent})"),
            TurnState::Streaming => f.write_str("streaming"),
            TurnState::Finalizing => f.write_str("finalizing"),
            TurnState::Done => f.write_str("done"),
            TurnState::Failed => f.write_str("failed"),
        }
    }
}

/// Why a turn stopped early.
enum TurnError {
    /// The caller dropped the stream.
    Cancelled,
    Fault(AeroError),
}

impl From<AeroError> for TurnError {
    fn from(err: AeroError) -> Self {
        TurnError::Fault(err)
    }
}

/// Sending half of a turn, tracking its state.
struct TurnSink {
    tx: mpsc::Sender<ResponseChunk>,
    state: TurnState,
}

impl TurnSink {
    fn transition(&mut self, next: TurnState) {
        tracing::debug!("[Orchestrator] {} -> {}", self.state, next);
        self.state = next;
    }

    async fn emit(
        &self,
        text: impl Into<String>,
        visualization: Option<VisualizationHandle>,
    ) -> Result<(), TurnError> {
        self.tx
            .send(ResponseChunk::new(text, visualization))
            .await
            .map_err(|_| TurnError::Cancelled)
    }
}

/// The question-answering entry point.
///
/// Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct QaOrchestrator {
    router: Arc<QueryRouter>,
    graph: Arc<dyn GraphQueryService>,
    graph_answer: Arc<GraphAnswerSynthesizer>,
    design: Arc<DesignSynthesizer>,
    visualizations: Arc<dyn VisualizationStore>,
    plans: Arc<dyn PlanRepository>,
}

impl QaOrchestrator {
    pub fn new(
        router: QueryRouter,
        graph: Arc<dyn GraphQueryService>,
        graph_answer: GraphAnswerSynthesizer,
        design: DesignSynthesizer,
        visualizations: Arc<dyn VisualizationStore>,
        plans: Arc<dyn PlanRepository>,
    ) -> Self {
        Self {
            router: Arc::new(router),
            graph,
            graph_answer: Arc::new(graph_answer),
            design: Arc::new(design),
            visualizations,
            plans,
        }
    }

    /// Wires every stage from configuration around one LLM client and one graph store.
    pub fn from_config(
        config: &AppConfig,
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn GraphStore>,
        visualizations: Arc<dyn VisualizationStore>,
        plans: Arc<dyn PlanRepository>,
    ) -> Self {
        let graph = CypherQaService::from_config(llm.clone(), store, &config.llm, &config.graph);
        Self::new(
            QueryRouter::from_config(llm.clone(), &config.llm),
            Arc::new(graph),
            GraphAnswerSynthesizer::from_config(llm.clone(), &config.llm),
            DesignSynthesizer::from_config(llm, &config.llm),
            visualizations,
            plans,
        )
    }

    /// Starts a turn and returns its chunk stream.
    ///
    /// Must be called within a tokio runtime. Dropping the stream cancels the
    /// turn at its next chunk; a cancelled turn leaves memory untouched.
    pub fn ask(&self, question: impl Into<String>, session: SharedSession) -> ResponseStream {
        let (tx, rx) = mpsc::channel(1);
        let this = self.clone();
        let question = question.into();
        tokio::spawn(async move {
            this.run_turn(question, session, tx).await;
        });
        ReceiverStream::new(rx)
    }

    async fn run_turn(&self, question: String, session: SharedSession, tx: mpsc::Sender<ResponseChunk>) {
        let mut sink = TurnSink {
            tx,
            state: TurnState::Start,
        };
        let history = session.history_text().await;

        match self.drive(&question, &history, &mut sink).await {
            Ok(answer) => {
                session.record_turn(question, answer).await;
                sink.transition(TurnState::Done);
            }
            Err(TurnError::Cancelled) => {
                tracing::info!("[Orchestrator] Turn cancelled by caller in state {}", sink.state);
            }
            Err(TurnError::Fault(err)) => {
                tracing::error!("[Orchestrator] Turn failed in state {}: {}", sink.state, err);
                sink.transition(TurnState::Failed);
                // A caller that already left has nothing to show it to.
                let _ = sink.emit(error_message(&err), None).await;
            }
        }
    }

    /// Runs the turn up to `Done`, returning the full answer text.
    async fn drive(&self, question: &str, history: &str, sink: &mut TurnSink) -> Result<String, TurnError> {
        let intent = self.router.classify(question).await?;
        sink.transition(TurnState::Routed(intent));

        match intent {
            Intent::GraphRetrieval => self.answer_from_graph(question, sink).await,
            Intent::DesignGeneration => self.generate_design(question, history, sink).await,
        }
    }

    async fn answer_from_graph(&self, question: &str, sink: &mut TurnSink) -> Result<String, TurnError> {
        let result = self.graph.query(question).await?;
        let handle = self.render_visualization(&result).await;

        sink.transition(TurnState::Streaming);
        sink.emit("", handle.clone()).await?;
        let tokens = self.graph_answer.stream(question, &result).await?;
        forward_tokens(tokens, handle, sink).await
    }

    async fn generate_design(
        &self,
        question: &str,
        history: &str,
        sink: &mut TurnSink,
    ) -> Result<String, TurnError> {
        sink.transition(TurnState::Streaming);
        sink.emit("", None).await?;
        let tokens = self.design.stream(question, history).await?;
        let mut answer = forward_tokens(tokens, None, sink).await?;

        sink.transition(TurnState::Finalizing);
        let notice = self.persist_plan(&answer).await;
        answer.push_str(&notice);
        sink.emit(notice, None).await?;
        Ok(answer)
    }

    /// Renders the records; a failed render only costs the visualization.
    async fn render_visualization(&self, result: &GraphQueryResult) -> Option<VisualizationHandle> {
        let view = build_graph_view(&result.records);
        match self.visualizations.save(&view).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!("[Orchestrator] Graph visualization failed: {}", err);
                None
            }
        }
    }

    /// Extracts and saves the plan table, returning the notice for the user.
    async fn persist_plan(&self, answer: &str) -> String {
        let Some(table) = extract_plan_table(answer) else {
            tracing::info!("[Orchestrator] No Phase 3 plan table in answer");
            return NO_TABLE_NOTICE.to_string();
        };

        let record = AssemblyPlanRecord::new(table);
        match self.plans.save(&record).await {
            Ok(path) => saved_notice(&path),
            Err(err) => {
                tracing::warn!("[Orchestrator] Saving plan failed: {}", err);
                CSV_FAILED_NOTICE.to_string()
            }
        }
    }
}

/// Forwards every token as its own chunk and returns the concatenation.
async fn forward_tokens(
    mut tokens: TokenStream,
    visualization: Option<VisualizationHandle>,
    sink: &TurnSink,
) -> Result<String, TurnError> {
    let mut answer = String::new();
    while let Some(token) = tokens.next().await {
        let token = token?;
        answer.push_str(&token);
        sink.emit(token, visualization.clone()).await?;
    }
    Ok(answer)
}
