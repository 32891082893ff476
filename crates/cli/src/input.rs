//! Cleaned-text input: one file with form-feed page breaks, or a directory
//! holding one file per page.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use walkdir::WalkDir;

use manual_core::DocumentLines;

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Page files under `dir`, sorted by path.
pub fn page_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !is_hidden(p))
        .collect();
    files.sort();
    files
}

pub fn read_document(path: &Path) -> Result<DocumentLines> {
    let doc = if path.is_dir() {
        let pages = page_files(path)
            .iter()
            .map(|p| {
                fs::read_to_string(p).with_context(|| format!("failed to read page {}", p.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        DocumentLines::from_pages(&pages)
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read input {}", path.display()))?;
        DocumentLines::from_text(&text)
    };
    info!(
        input = %path.display(),
        pages = doc.page_count(),
        lines = doc.len(),
        "read document"
    );
    Ok(doc)
}
