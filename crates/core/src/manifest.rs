//! Structural records: detected boundaries and the manifest tree built from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Joins the manual id and hierarchy path ids into a `chunk_id`.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Separates a chunk id from its part number when one entry yields several chunks.
pub const PART_SEPARATOR: char = '#';

// ── Boundary ────────────────────────────────────────────────────────

/// One detected structural marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub level: u32,
    pub level_name: String,
    pub id: Option<String>,
    pub title: Option<String>,
    /// 0-based page index.
    pub page_number: usize,
    /// Absolute line position across the whole document.
    pub line_offset: usize,
}

// ── Ranges ──────────────────────────────────────────────────────────

/// Half-open `[start, end)` range of absolute line offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains_range(&self, other: &LineRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Inclusive range of 0-based page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

// ── Manifest ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub chunk_id: String,
    pub level: u32,
    pub level_name: String,
    pub title: String,
    /// Ordered ids from the top-level group down to this entry.
    pub hierarchy_path: Vec<String>,
    pub parent_chunk_id: Option<String>,
    pub children: Vec<String>,
    pub content_type: String,
    pub page_range: PageRange,
    pub line_range: LineRange,
}

impl ManifestEntry {
    /// Id of the top-level group this entry belongs to.
    pub fn level1_id(&self) -> Option<&str> {
        self.hierarchy_path.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub manual_id: String,
    /// Entries in document order; parent/children links form the tree.
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(manual_id: impl Into<String>) -> Self {
        Self {
            manual_id: manual_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, chunk_id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.chunk_id == chunk_id)
    }

    /// Chunk id → entry, for repeated lookups.
    pub fn index(&self) -> HashMap<&str, &ManifestEntry> {
        self.entries
            .iter()
            .map(|e| (e.chunk_id.as_str(), e))
            .collect()
    }

    /// Entries without a parent, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.parent_chunk_id.is_none())
    }

    /// Entries from the root down to `chunk_id` inclusive. Empty if unknown.
    pub fn ancestry(&self, chunk_id: &str) -> Vec<&ManifestEntry> {
        let index = self.index();
        let mut chain = Vec::new();
        let mut cursor = index.get(chunk_id).copied();
        while let Some(entry) = cursor {
            chain.push(entry);
            cursor = entry
                .parent_chunk_id
                .as_deref()
                .and_then(|p| index.get(p).copied());
        }
        chain.reverse();
        chain
    }
}

// ── Chunk ids ───────────────────────────────────────────────────────

/// Make an id usable as a single path segment.
pub fn sanitize_segment(id: &str) -> String {
    id.trim()
        .replace(NAMESPACE_SEPARATOR, "-")
        .replace(PART_SEPARATOR, "-")
}

/// `manual_id` followed by each path id, joined with `::`.
pub fn format_chunk_id<S: AsRef<str>>(manual_id: &str, hierarchy_path: &[S]) -> String {
    let mut id = manual_id.to_string();
    for segment in hierarchy_path {
        id.push_str(NAMESPACE_SEPARATOR);
        id.push_str(segment.as_ref());
    }
    id
}

/// Chunk id for the `part`-th (1-based) chunk cut from one entry.
pub fn part_chunk_id(base: &str, part: usize) -> String {
    if part <= 1 {
        base.to_string()
    } else {
        format!("{base}{PART_SEPARATOR}{part}")
    }
}

/// A chunk id taken apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkId {
    pub manual_id: String,
    pub hierarchy_path: Vec<String>,
    pub part: Option<usize>,
}

impl ChunkId {
    pub fn parse(chunk_id: &str) -> Self {
        let (base, part) = match chunk_id.rsplit_once(PART_SEPARATOR) {
            Some((base, n)) => match n.parse::<usize>() {
                Ok(n) => (base, Some(n)),
                Err(_) => (chunk_id, None),
            },
            None => (chunk_id, None),
        };
        let mut segments = base.split(NAMESPACE_SEPARATOR).map(str::to_string);
        let manual_id = segments.next().unwrap_or_default();
        Self {
            manual_id,
            hierarchy_path: segments.collect(),
            part,
        }
    }

    /// The chunk id without its part suffix.
    pub fn base(&self) -> String {
        format_chunk_id(&self.manual_id, &self.hierarchy_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, parent: Option<&str>, path: &[&str]) -> ManifestEntry {
        ManifestEntry {
            chunk_id: id.to_string(),
            level: path.len() as u32,
            level_name: "level".to_string(),
            title: id.to_string(),
            hierarchy_path: path.iter().map(|s| s.to_string()).collect(),
            parent_chunk_id: parent.map(str::to_string),
            children: vec![],
            content_type: "level".to_string(),
            page_range: PageRange::default(),
            line_range: LineRange::default(),
        }
    }

    #[test]
    fn format_chunk_id_joins_path() {
        assert_eq!(
            format_chunk_id("xj-1999", &["0", "SP", "JSP"]),
            "xj-1999::0::SP::JSP"
        );
        assert_eq!(format_chunk_id::<&str>("xj-1999", &[]), "xj-1999");
    }

    #[test]
    fn parse_reconstructs_hierarchy_path() {
        let id = ChunkId::parse("xj-1999::8A::COOLING::DRAIN#3");
        assert_eq!(id.manual_id, "xj-1999");
        assert_eq!(id.hierarchy_path, vec!["8A", "COOLING", "DRAIN"]);
        assert_eq!(id.part, Some(3));
        assert_eq!(id.base(), "xj-1999::8A::COOLING::DRAIN");
    }

    #[test]
    fn parse_ignores_non_numeric_part() {
        let id = ChunkId::parse("m::a#b");
        assert_eq!(id.hierarchy_path, vec!["a#b"]);
        assert_eq!(id.part, None);
    }

    #[test]
    fn part_ids_only_suffix_after_first() {
        assert_eq!(part_chunk_id("m::1", 1), "m::1");
        assert_eq!(part_chunk_id("m::1", 2), "m::1#2");
    }

    #[test]
    fn sanitize_removes_separators() {
        assert_eq!(sanitize_segment(" A::B#C "), "A-B-C");
    }

    #[test]
    fn ancestry_walks_to_root() {
        let manifest = Manifest {
            manual_id: "m".to_string(),
            entries: vec![
                entry("m::1", None, &["1"]),
                entry("m::1::S", Some("m::1"), &["1", "S"]),
                entry("m::1::S::P", Some("m::1::S"), &["1", "S", "P"]),
            ],
        };
        let chain: Vec<&str> = manifest
            .ancestry("m::1::S::P")
            .iter()
            .map(|e| e.chunk_id.as_str())
            .collect();
        assert_eq!(chain, vec!["m::1", "m::1::S", "m::1::S::P"]);
        assert!(manifest.ancestry("missing").is_empty());
        assert_eq!(manifest.roots().count(), 1);
    }

    #[test]
    fn line_range_containment() {
        let outer = LineRange::new(0, 10);
        assert!(outer.contains_range(&LineRange::new(2, 10)));
        assert!(!outer.contains_range(&LineRange::new(2, 11)));
        assert!(!LineRange::new(0, 3).overlaps(&LineRange::new(3, 5)));
        assert!(LineRange::new(5, 5).is_empty());
    }
}
