//! urpaq-storage
//!
//! Document sources: S3-compatible object storage, PDF files and
//! directories of plain-text files.
pub mod keys;
pub mod memory;
pub mod pdf;
pub mod s3;
pub mod text_dir;

pub use keys::{decode_object, stable_document_id, upload_key};
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;
