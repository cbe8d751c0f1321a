//! Reference documents about the palace that ship with the binary.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::types::RetrievalDocument;

const BUILTIN_SEED: &str = include_str!("../data/seed_documents.json");

/// The built-in set: bell schedule, overview, directions, contacts,
/// statistics, advantages, summer academy and staff.
pub fn builtin_documents() -> Result<Vec<RetrievalDocument>> {
    Ok(serde_json::from_str(BUILTIN_SEED)?)
}

/// Read a JSON array of `{id, name, text}` objects.
pub fn load_seed_documents(path: &Path) -> Result<Vec<RetrievalDocument>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
