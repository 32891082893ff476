//! JSON manifest and JSONL chunk files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use manual_core::{Chunk, Manifest, PipelineError, Result};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const CHUNKS_FILE: &str = "chunks.jsonl";

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Save the manifest as pretty-printed JSON.
pub fn save_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save chunks one JSON record per line.
pub fn save_chunks(chunks: &[Chunk], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    for chunk in chunks {
        serde_json::to_writer(&mut out, chunk)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Load chunks from JSONL. Blank lines are skipped; a malformed record
/// reports its 1-based line number.
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let reader = BufReader::new(File::open(path)?);
    let mut chunks = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk = serde_json::from_str(&line).map_err(|e| PipelineError::InvalidRecord {
            line: i + 1,
            message: e.to_string(),
        })?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Output layout: one directory per manual under `base_dir`.
///
/// ```text
/// output/
///   xj-1999/
///     manifest.json
///     chunks.jsonl
/// ```
pub struct ManualStore {
    base_dir: PathBuf,
}

impl ManualStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn manual_dir(&self, manual_id: &str) -> PathBuf {
        self.base_dir.join(manual_id)
    }

    pub fn manifest_path(&self, manual_id: &str) -> PathBuf {
        self.manual_dir(manual_id).join(MANIFEST_FILE)
    }

    pub fn chunks_path(&self, manual_id: &str) -> PathBuf {
        self.manual_dir(manual_id).join(CHUNKS_FILE)
    }

    /// Write both files for one manual.
    pub fn save(&self, manifest: &Manifest, chunks: &[Chunk]) -> Result<()> {
        let manifest_path = self.manifest_path(&manifest.manual_id);
        let chunks_path = self.chunks_path(&manifest.manual_id);
        save_manifest(manifest, &manifest_path)?;
        save_chunks(chunks, &chunks_path)?;
        info!(
            manual_id = %manifest.manual_id,
            entries = manifest.entries.len(),
            chunks = chunks.len(),
            dir = %self.manual_dir(&manifest.manual_id).display(),
            "saved manual output"
        );
        Ok(())
    }

    pub fn load(&self, manual_id: &str) -> Result<(Manifest, Vec<Chunk>)> {
        let manifest = load_manifest(&self.manifest_path(manual_id))?;
        let chunks = load_chunks(&self.chunks_path(manual_id))?;
        Ok((manifest, chunks))
    }
}
