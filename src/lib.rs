//! Schema enrichment and relationship discovery library.
//!
//! Given a project's already-imported tables and columns, this crate
//! drives an LLM through bounded, retried, circuit-broken calls to (a)
//! enrich each column with a description, semantic type, and role, and
//! (b) discover and persist cross-table foreign-key relationships. It
//! owns none of schema import, LLM request routing, or the HTTP/gRPC
//! surface a caller exposes it through; those are external collaborators
//! wired in through the trait seams in `repository`, `discoverer`, and
//! `llm`.

pub mod config;
pub mod detectors;
pub mod discoverer;
pub mod discovery;
pub mod enrichment;
pub mod enum_catalog;
pub mod error;
pub mod llm;
pub mod model;
pub mod reliability;
pub mod repository;
pub mod tenant;

pub use config::Config;
pub use discoverer::SchemaDiscoverer;
pub use discovery::{CandidateCollector, DiscoveryResult, RelationshipDiscoveryEngine, RelationshipPersister, RelationshipValidator};
pub use enrichment::{ColumnEnrichmentEngine, EnrichmentResult};
pub use error::EnrichmentError;
pub use llm::{LlmClient, LlmFactory};
pub use repository::{EntityRepo, OntologyRepo, RelationshipRepo, SchemaRepo, SqliteRepositories};
pub use tenant::TenantScope;
