//! End-to-end turns through `QaOrchestrator` with in-memory collaborators.

use aeroplan_application::{
    DesignSynthesizer, GraphAnswerSynthesizer, QaOrchestrator, QueryRouter, ResponseChunk,
};
use aeroplan_core::graph::{GraphQueryResult, GraphQueryService, GraphView};
use aeroplan_core::llm::{CompletionRequest, LlmClient, TokenStream};
use aeroplan_core::plan::{AssemblyPlanRecord, PlanRepository};
use aeroplan_core::session::{ConversationSession, SharedSession};
use aeroplan_core::visualization::{VisualizationHandle, VisualizationStore};
use aeroplan_core::{AeroError, Result, UnrecognizedIntentPolicy};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Duration;

const ROUTER_MODEL: &str = "router-model";
const ANSWER_MODEL: &str = "answer-model";
const DESIGN_MODEL: &str = "design-model";

/// Router answers come from `route`; token streams are chosen by model.
/// A `stream_fault` is yielded after the scripted tokens.
struct ScriptedLlm {
    route: Result<String>,
    answer_tokens: Vec<&'static str>,
    design_tokens: Vec<&'static str>,
    stream_fault: Option<AeroError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    fn new(route: &str) -> Self {
        Self {
            route: Ok(route.to_string()),
            answer_tokens: vec!["JigIn", " precedes", " Drilling"],
            design_tokens: vec![
                "Phase 3. Plan\n",
                "|Order|Operation|\n|---|---|\n",
                "|1|JigIn|\n",
                "\nPhase 4. Validation",
            ],
            stream_fault: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn prompts_for(&self, model: &str) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.model == model)
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        self.route.clone()
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TokenStream> {
        let tokens = match request.model.as_str() {
            ANSWER_MODEL => self.answer_tokens.clone(),
            _ => self.design_tokens.clone(),
        };
        self.requests.lock().unwrap().push(request);
        let mut items: Vec<Result<String>> = tokens.into_iter().map(|t| Ok(t.to_string())).collect();
        if let Some(fault) = &self.stream_fault {
            items.push(Err(fault.clone()));
        }
        Ok(stream::iter(items).boxed())
    }
}

struct FixedGraph(Result<GraphQueryResult>);

#[async_trait]
impl GraphQueryService for FixedGraph {
    async fn query(&self, _question: &str) -> Result<GraphQueryResult> {
        self.0.clone()
    }
}

#[derive(Default)]
struct RecordingVisualizations {
    fail: bool,
    views: Mutex<Vec<GraphView>>,
}

#[async_trait]
impl VisualizationStore for RecordingVisualizations {
    async fn save(&self, view: &GraphView) -> Result<VisualizationHandle> {
        if self.fail {
            return Err(AeroError::io("disk full"));
        }
        self.views.lock().unwrap().push(view.clone());
        Ok(VisualizationHandle::new("/static/graph_test.html"))
    }
}

#[derive(Default)]
struct RecordingPlans {
    fail: bool,
    saved: Mutex<Vec<AssemblyPlanRecord>>,
}

#[async_trait]
impl PlanRepository for RecordingPlans {
    async fn save(&self, record: &AssemblyPlanRecord) -> Result<PathBuf> {
        if self.fail {
            return Err(AeroError::persistence("read-only"));
        }
        self.saved.lock().unwrap().push(record.clone());
        Ok(PathBuf::from(format!("./plans/{}.csv", record.file_stem())))
    }

    async fn latest(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

struct Harness {
    llm: Arc<ScriptedLlm>,
    visualizations: Arc<RecordingVisualizations>,
    plans: Arc<RecordingPlans>,
    orchestrator: QaOrchestrator,
    session: SharedSession,
}

impl Harness {
    fn build(
        llm: ScriptedLlm,
        graph: Result<GraphQueryResult>,
        visualizations: RecordingVisualizations,
        plans: RecordingPlans,
        policy: UnrecognizedIntentPolicy,
    ) -> Self {
        let llm = Arc::new(llm);
        let visualizations = Arc::new(visualizations);
        let plans = Arc::new(plans);
        let orchestrator = QaOrchestrator::new(
            QueryRouter::new(llm.clone(), ROUTER_MODEL).with_policy(policy),
            Arc::new(FixedGraph(graph)),
            GraphAnswerSynthesizer::new(llm.clone(), ANSWER_MODEL, Some(0.0)),
            DesignSynthesizer::new(llm.clone(), DESIGN_MODEL, None),
            visualizations.clone(),
            plans.clone(),
        );
        Self {
            llm,
            visualizations,
            plans,
            orchestrator,
            session: ConversationSession::shared(10),
        }
    }

    fn routed(route: &str) -> Self {
        Self::build(
            ScriptedLlm::new(route),
            Ok(pairs_result()),
            RecordingVisualizations::default(),
            RecordingPlans::default(),
            UnrecognizedIntentPolicy::Reject,
        )
    }

    async fn ask(&self, question: &str) -> Vec<ResponseChunk> {
        self.orchestrator
            .ask(question, self.session.clone())
            .collect()
            .await
    }
}

fn pairs_result() -> GraphQueryResult {
    GraphQueryResult::new(
        "MATCH (a)-[:hasPredecessor]->(b) RETURN a.name AS a, b.name AS b",
        vec![json!({"a": "X", "b": "Y"}), json!({"a": "Y", "b": "Z"})],
    )
}

fn text_of(chunks: &[ResponseChunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

#[tokio::test]
async fn test_graph_turn_streams_tokens_with_handle() {
    let harness = Harness::routed("graph");

    let chunks = harness.ask("What is the predecessor of Drilling?").await;

    let handle = VisualizationHandle::new("/static/graph_test.html");
    assert_eq!(chunks[0], ResponseChunk::new("", Some(handle.clone())));
    assert_eq!(chunks.len(), 4);
    assert!(chunks.iter().all(|c| c.visualization.as_ref() == Some(&handle)));
    assert_eq!(text_of(&chunks), "JigIn precedes Drilling");

    let views = harness.visualizations.views.lock().unwrap();
    assert_eq!(views[0].nodes().len(), 3);
    assert_eq!(views[0].edges().len(), 2);
    drop(views);

    let memory = harness.session.memory_snapshot().await;
    let turn = memory.turns().next().unwrap();
    assert_eq!(turn.input, "What is the predecessor of Drilling?");
    assert_eq!(turn.output, "JigIn precedes Drilling");

    let answer_prompt = &harness.llm.prompts_for(ANSWER_MODEL)[0];
    assert!(answer_prompt.contains("RETURN a.name AS a, b.name AS b"));
    assert!(answer_prompt.contains(r#"{"a":"X","b":"Y"}"#));
}

#[tokio::test]
async fn test_router_prompt_carries_predecessor_rule() {
    let harness = Harness::routed("graph");
    harness.ask("Which operation is the predecessor of Sealing?").await;

    let router_prompt = &harness.llm.prompts_for(ROUTER_MODEL)[0];
    assert!(router_prompt.contains("User Query: Which operation is the predecessor of Sealing?"));
    assert!(router_prompt.contains("\"predecessor\""));
    // Routed to graph: the answer model was used, the design model was not
    assert_eq!(harness.llm.prompts_for(ANSWER_MODEL).len(), 1);
    assert!(harness.llm.prompts_for(DESIGN_MODEL).is_empty());
}

#[tokio::test]
async fn test_design_turn_saves_plan_and_reports_path() {
    let harness = Harness::routed("design");

    let chunks = harness.ask("Generate the joint plan").await;

    assert_eq!(chunks[0], ResponseChunk::new("", None));
    assert!(chunks.iter().all(|c| c.visualization.is_none()));

    let saved = harness.plans.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(
        saved[0].table.rows(),
        &[
            vec!["Order".to_string(), "Operation".to_string()],
            vec!["1".to_string(), "JigIn".to_string()],
        ]
    );

    let expected_notice = format!(
        "\n\n✅ **The assembly plan has been saved as a CSV file:** `./plans/{}.csv`",
        saved[0].file_stem()
    );
    assert_eq!(chunks.last().unwrap().text, expected_notice);

    let memory = harness.session.memory_snapshot().await;
    let output = &memory.turns().next().unwrap().output;
    assert!(output.starts_with("Phase 3. Plan\n"));
    assert!(output.ends_with(&expected_notice));
    assert!(harness.visualizations.views.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_design_without_table_warns_and_still_records() {
    let mut llm = ScriptedLlm::new("design");
    llm.design_tokens = vec!["Phase 3. Plan\n", "No table today.\n", "Phase 4. Done"];
    let harness = Harness::build(
        llm,
        Ok(pairs_result()),
        RecordingVisualizations::default(),
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::Reject,
    );

    let chunks = harness.ask("Plan it").await;

    assert_eq!(
        chunks.last().unwrap().text,
        "\n⚠️ No formatting compliant Markdown table detected, CSV not saved."
    );
    assert!(harness.plans.saved.lock().unwrap().is_empty());
    assert_eq!(harness.session.memory_snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_plan_save_failure_is_a_warning() {
    let harness = Harness::build(
        ScriptedLlm::new("design"),
        Ok(pairs_result()),
        RecordingVisualizations::default(),
        RecordingPlans {
            fail: true,
            ..Default::default()
        },
        UnrecognizedIntentPolicy::Reject,
    );

    let chunks = harness.ask("Plan it").await;

    assert_eq!(chunks.last().unwrap().text, "\n⚠️ CSV generation failed.");
    let memory = harness.session.memory_snapshot().await;
    assert!(memory.turns().next().unwrap().output.ends_with("CSV generation failed."));
}

#[tokio::test]
async fn test_design_prompt_sees_previous_turns() {
    let harness = Harness::routed("design");
    harness
        .session
        .record_turn("List the resources", "Crane (1), Jig (2)")
        .await;

    harness.ask("Now plan the joint").await;

    let design_prompt = &harness.llm.prompts_for(DESIGN_MODEL)[0];
    assert!(design_prompt.contains("Human: List the resources\nAI: Crane (1), Jig (2)"));
    assert_eq!(harness.session.memory_snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_unrecognized_route_fails_turn_without_memory() {
    let harness = Harness::routed("maybe both?");

    let chunks = harness.ask("Hello").await;

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0]
        .text
        .starts_with("Sorry, there was an error while processing your question: "));
    assert!(chunks[0].text.contains("maybe both?"));
    assert!(chunks[0].visualization.is_none());
    assert!(harness.session.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn test_fallback_policy_routes_unrecognized_to_graph() {
    let harness = Harness::build(
        ScriptedLlm::new("maybe both?"),
        Ok(pairs_result()),
        RecordingVisualizations::default(),
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::FallbackToGraph,
    );

    let chunks = harness.ask("Hello").await;

    assert_eq!(text_of(&chunks), "JigIn precedes Drilling");
    assert_eq!(harness.session.memory_snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_retrieval_failure_emits_single_error_chunk() {
    let harness = Harness::build(
        ScriptedLlm::new("graph"),
        Err(AeroError::retrieval("Neo4j unavailable")),
        RecordingVisualizations::default(),
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::Reject,
    );

    let chunks = harness.ask("What precedes Drilling?").await;

    assert_eq!(
        chunks,
        vec![ResponseChunk::new(
            "Sorry, there was an error while processing your question: Graph retrieval error: Neo4j unavailable",
            None
        )]
    );
    assert!(harness.session.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn test_visualization_failure_degrades_to_no_handle() {
    let harness = Harness::build(
        ScriptedLlm::new("graph"),
        Ok(pairs_result()),
        RecordingVisualizations {
            fail: true,
            ..Default::default()
        },
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::Reject,
    );

    let chunks = harness.ask("What precedes Drilling?").await;

    assert!(chunks.iter().all(|c| c.visualization.is_none()));
    assert_eq!(text_of(&chunks), "JigIn precedes Drilling");
    assert_eq!(harness.session.memory_snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_dropped_stream_cancels_turn() {
    let mut llm = ScriptedLlm::new("graph");
    llm.answer_tokens = vec!["a", "b", "c", "d", "e", "f"];
    let harness = Harness::build(
        llm,
        Ok(pairs_result()),
        RecordingVisualizations::default(),
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::Reject,
    );

    let mut stream = harness.orchestrator.ask("q", harness.session.clone());
    let first = stream.next().await.unwrap();
    assert_eq!(first.text, "");
    drop(stream);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.session.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn test_graph_stream_fault_aborts_turn() {
    let mut llm = ScriptedLlm::new("graph");
    llm.answer_tokens = vec!["a"];
    llm.stream_fault = Some(AeroError::generation("connection reset"));
    let harness = Harness::build(
        llm,
        Ok(pairs_result()),
        RecordingVisualizations::default(),
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::Reject,
    );

    let chunks = harness.ask("What precedes Drilling?").await;

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "",
            "a",
            "Sorry, there was an error while processing your question: Generation error: connection reset",
        ]
    );
    assert!(chunks.last().unwrap().visualization.is_none());
    assert!(harness.session.memory_snapshot().await.is_empty());
}

#[tokio::test]
async fn test_design_stream_fault_skips_plan_save() {
    let mut llm = ScriptedLlm::new("design");
    llm.design_tokens = vec!["Phase 3. Plan\n", "|Order|Operation|\n|---|---|\n|1|JigIn|\n"];
    llm.stream_fault = Some(AeroError::generation("stream closed"));
    let harness = Harness::build(
        llm,
        Ok(pairs_result()),
        RecordingVisualizations::default(),
        RecordingPlans::default(),
        UnrecognizedIntentPolicy::Reject,
    );

    let chunks = harness.ask("Plan it").await;

    assert_eq!(
        chunks.last().unwrap().text,
        "Sorry, there was an error while processing your question: Generation error: stream closed"
    );
    assert!(!text_of(&chunks).contains("CSV"));
    assert!(harness.plans.saved.lock().unwrap().is_empty());
    assert!(harness.session.memory_snapshot().await.is_empty());
}
