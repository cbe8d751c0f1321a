use std::path::Path;

use tracing::{error, info, warn};

use urpaq_core::error::{Error, Result};

pub fn extract_pdf_bytes(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::Extraction(e.to_string()))
}

/// Text of the PDF at `path`, or an empty string when the file is missing
/// or unreadable.
pub fn load_pdf_if_exists(path: &Path) -> String {
    if !path.exists() {
        warn!("PDF file not found: {}", path.display());
        return String::new();
    }

    info!("Loading PDF from: {}", path.display());
    let loaded = std::fs::read(path).map_err(Error::from).and_then(|bytes| extract_pdf_bytes(&bytes));
    match loaded {
        Ok(text) => {
            info!("PDF loaded successfully, length: {} chars", text.chars().count());
            text
        }
        Err(e) => {
            error!("Error loading PDF: {}", e);
            String::new()
        }
    }
}
