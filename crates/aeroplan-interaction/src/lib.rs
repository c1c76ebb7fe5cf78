//! Adapters for the external services Aeroplan talks to: an
//! OpenAI-compatible chat completion API and a Neo4j HTTP endpoint.

pub mod neo4j_http_store;
pub mod openai_api_client;
pub mod sse;

pub use neo4j_http_store::Neo4jHttpStore;
pub use openai_api_client::OpenAiApiClient;
