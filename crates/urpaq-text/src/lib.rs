//! urpaq-text
//!
//! Tantivy-backed document store: an upserting repository of
//! `RetrievalDocument`s with Russian-aware full-text search over name and text.
pub mod store;
pub mod tantivy_utils;

pub use store::TantivyDocumentStore;
