//! Application layer for Aeroplan.
//!
//! Coordinates the router, the graph and design pipelines and plan
//! persistence into a single streamed question-answering turn.

pub mod cypher_qa;
pub mod orchestrator;
pub mod prompts;
pub mod router;
pub mod synthesizer;

pub use cypher_qa::CypherQaService;
pub use orchestrator::{QaOrchestrator, ResponseChunk, ResponseStream, TurnState};
pub use router::QueryRouter;
pub use synthesizer::{DesignSynthesizer, GraphAnswerSynthesizer};
