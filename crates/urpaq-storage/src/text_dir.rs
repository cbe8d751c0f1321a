use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use urpaq_core::error::Result;
use urpaq_core::types::RetrievalDocument;

/// Every `.txt` file under `dir`, recursively and in path order. The id is
/// the path relative to `dir`, the name is the file stem.
pub fn load_txt_documents(dir: &Path) -> Result<Vec<RetrievalDocument>> {
    let files = list_txt_files(dir);
    if files.is_empty() {
        warn!("No .txt files found under {}", dir.display());
        return Ok(Vec::new());
    }

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => String::from_utf8_lossy(&fs::read(path)?).into_owned(),
        };
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let name = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        documents.push(RetrievalDocument {
            id: relative.to_string_lossy().replace('\\', "/"),
            name,
            text,
        });
    }
    info!("Loaded {} text documents from {}", documents.len(), dir.display());
    Ok(documents)
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
        .map(|e| e.into_path())
        .collect();
    txt_files.sort();
    txt_files
}
