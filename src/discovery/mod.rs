//! Relationship Discovery Pipeline: candidate collection, LLM validation,
//! and idempotent bidirectional persistence.

mod collector;
mod engine;
mod persister;
mod type_category;
mod validator;

pub use collector::{CandidateCollector, CollectorConfig, ProgressCallback};
pub use engine::{DiscoveryResult, RelationshipDiscoveryEngine};
pub use persister::RelationshipPersister;
pub use validator::RelationshipValidator;
