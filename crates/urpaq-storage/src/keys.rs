use std::hash::Hasher;

use chrono::{DateTime, Utc};
use twox_hash::XxHash64;
use uuid::Uuid;

use urpaq_core::error::Result;

use crate::pdf;

/// `documents/<category>/<epoch millis>-<uuid>-<file_name>`
pub fn upload_key(category: &str, file_name: &str, now: DateTime<Utc>) -> String {
    format!("documents/{}/{}-{}-{}", category, now.timestamp_millis(), Uuid::new_v4(), file_name)
}

/// Deterministic document id for an object key, so reloading a bucket
/// overwrites earlier copies.
pub fn stable_document_id(key: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(key.as_bytes());
    format!("{:016x}", hasher.finish())
}

/// Object bytes as text: PDF extraction for `.pdf` keys, lossy UTF-8 otherwise.
pub fn decode_object(key: &str, bytes: &[u8]) -> Result<String> {
    if key.to_lowercase().ends_with(".pdf") {
        pdf::extract_pdf_bytes(bytes)
    } else {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
