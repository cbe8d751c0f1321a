//! urpaq-core
//!
//! Domain types, service seams, configuration and chunking shared by the
//! index, model, storage and pipeline crates.

pub mod chunker;
pub mod config;
pub mod error;
pub mod seed;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
