//! Detected spans and the chunk plan the rule pipeline transforms.

use manual_core::CalloutLevel;
use manual_profile::CompiledProfile;

// ── Spans ───────────────────────────────────────────────────────────

/// Half-open `[start, end)` line span, local to one entry's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.start <= line && line < self.end
    }

    /// True when cutting before `line` would separate this span.
    pub fn splits_at(&self, cut: usize) -> bool {
        self.start < cut && cut < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSequenceSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl StepSequenceSpan {
    pub fn span(&self) -> Span {
        Span::new(self.start_line, self.end_line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyCalloutSpan {
    pub level: CalloutLevel,
    pub text: String,
    pub line_range: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl TableSpan {
    pub fn span(&self) -> Span {
        Span::new(self.start_line, self.end_line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureReference {
    pub id: String,
    pub line: usize,
}

/// Everything detection finds in one entry's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedSpans {
    pub steps: Vec<StepSequenceSpan>,
    pub callouts: Vec<SafetyCalloutSpan>,
    pub tables: Vec<TableSpan>,
    pub figures: Vec<FigureReference>,
    /// Callout plus the procedure it governs.
    pub safety_attachments: Vec<Span>,
}

// ── Chunk plan ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    Steps,
    SafetyAttachment,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub kind: Protection,
    pub span: Span,
}

/// Candidate chunks as contiguous line spans covering the entry text, plus
/// the spans no later cut may fall inside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    pub candidates: Vec<Span>,
    pub protected: Vec<ProtectedSpan>,
}

impl ChunkPlan {
    /// Interior cut points between consecutive candidates.
    pub fn cuts(&self) -> Vec<usize> {
        self.candidates.iter().skip(1).map(|c| c.start).collect()
    }

    /// Rebuild candidates over `[0, len)` from cut points. Cuts are sorted,
    /// deduplicated and clamped to the interior.
    pub fn with_cuts(self, len: usize, mut cuts: Vec<usize>) -> Self {
        cuts.retain(|&c| c > 0 && c < len);
        cuts.sort_unstable();
        cuts.dedup();
        let mut candidates = Vec::with_capacity(cuts.len() + 1);
        let mut start = 0;
        for cut in cuts {
            candidates.push(Span::new(start, cut));
            start = cut;
        }
        if len > 0 {
            candidates.push(Span::new(start, len));
        }
        Self {
            candidates,
            protected: self.protected,
        }
    }

    pub fn protect(mut self, kind: Protection, spans: impl IntoIterator<Item = Span>) -> Self {
        self.protected
            .extend(spans.into_iter().map(|span| ProtectedSpan { kind, span }));
        self
    }

    pub fn is_protected_cut(&self, cut: usize) -> bool {
        self.protected.iter().any(|p| p.span.splits_at(cut))
    }
}

/// Read-only inputs for the rules of one entry.
pub struct EntryContext<'a> {
    /// The entry's own lines, leading and trailing blank lines removed.
    pub lines: &'a [String],
    pub profile: &'a CompiledProfile,
    pub spans: &'a DetectedSpans,
    word_counts: Vec<usize>,
}

impl<'a> EntryContext<'a> {
    pub fn new(lines: &'a [String], profile: &'a CompiledProfile, spans: &'a DetectedSpans) -> Self {
        Self {
            lines,
            profile,
            spans,
            word_counts: lines.iter().map(|l| manual_core::count_words(l)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_blank(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.trim().is_empty())
    }

    pub fn words(&self, span: Span) -> usize {
        let end = span.end.min(self.word_counts.len());
        let start = span.start.min(end);
        self.word_counts[start..end].iter().sum()
    }

    pub fn tokens(&self, span: Span) -> usize {
        self.profile.sizes.tokens_for_words(self.words(span))
    }

    /// Non-blank lines of `span` with their local indices.
    pub fn content_lines(&self, span: Span) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        let lines = self.lines;
        (span.start..span.end.min(lines.len()))
            .map(move |i| (i, lines[i].trim()))
            .filter(|(_, l)| !l.is_empty())
    }
}
