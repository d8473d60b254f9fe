//! Column Enrichment Engine and its LLM response wire types.

mod engine;
mod response;

pub use engine::{ColumnEnrichmentEngine, EnrichmentResult, ProgressCallback, CHUNK_SIZE};
pub use response::{ChunkResponse, ColumnEnrichment, FollowUpQuestion};
