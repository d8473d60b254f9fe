//! LLM client/factory interfaces and a reference OpenAI-compatible
//! implementation. Consumers depend only on [`LlmClient`]/[`LlmFactory`];
//! the HTTP implementation is one interchangeable collaborator.

mod http_client;
pub mod prompts;

use async_trait::async_trait;

use crate::error::EnrichmentError;

pub use http_client::{HttpLlmClient, HttpLlmFactory, LlmProviderConfig};

/// Consumed LLM transport. `generate_response` returns the raw content
/// string (callers parse the JSON shape they expect); errors are the
/// engine's own typed errors so retryability travels with them.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate_response(
        &self,
        prompt: &str,
        system_message: &str,
        temperature: f64,
    ) -> Result<String, EnrichmentError>;

    async fn close(&self);
}

/// Builds a project-bound `LlmClient`, e.g. selecting the provider and
/// credentials configured for that project.
#[async_trait]
pub trait LlmFactory: Send + Sync {
    async fn create_for_project(&self, project_id: i64) -> Result<Box<dyn LlmClient>, EnrichmentError>;
}
