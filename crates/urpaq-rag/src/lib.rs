//! urpaq-rag
//!
//! Retrieval-augmented answering: query classification, cached hybrid
//! search, prompt assembly, generation with fallback, response validation
//! and metrics, plus the document and chat services built on top of it.
pub mod cache;
pub mod context;
pub mod ingest;
pub mod metrics;
pub mod orchestrator;
pub mod query;
pub mod retrieval;
pub mod services;
pub mod validator;

pub use cache::{CacheService, CacheStats};
pub use metrics::{MetricsSnapshot, RagMetrics};
pub use orchestrator::{RagOrchestrator, RagResponse};
pub use retrieval::RetrievalService;
