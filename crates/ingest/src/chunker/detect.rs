//! Pure detectors over one entry's lines: step sequences, safety callouts,
//! tables, figure references, and the safety attachments built from them.

use regex::Regex;

use manual_profile::{CalloutStyle, CompiledCallout, CompiledProfile};

use super::types::*;

/// Ordinals that open a new step sequence.
pub const FIRST_ORDINALS: &[&str] = &["1", "a", "A", "i", "I"];

fn is_blank(lines: &[String], i: usize) -> bool {
    lines.get(i).is_some_and(|l| l.trim().is_empty())
}

// ── Steps ───────────────────────────────────────────────────────────

/// Index of the first matching step pattern and the captured ordinal.
fn step_match(line: &str, patterns: &[Regex]) -> Option<(usize, Option<String>)> {
    let line = line.trim();
    patterns.iter().enumerate().find_map(|(i, re)| {
        re.captures(line)
            .map(|caps| (i, caps.get(1).map(|m| m.as_str().to_string())))
    })
}

fn callout_at(line: &str, callouts: &[CompiledCallout]) -> Option<usize> {
    let line = line.trim();
    callouts.iter().position(|c| c.pattern.is_match(line))
}

/// True when `next` is the letter directly after `prev` (`h` → `i`), so a
/// lettered list reaching `i` is not mistaken for a roman restart.
fn is_successor(prev: Option<&str>, next: &str) -> bool {
    let (Some(prev), Some(next)) = (prev.and_then(single_letter), single_letter(next)) else {
        return false;
    };
    u32::from(prev) + 1 == u32::from(next)
}

fn single_letter(ordinal: &str) -> Option<char> {
    let mut chars = ordinal.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}

/// Group step lines and their continuation lines into sequences.
///
/// A sequence survives blank lines and callout blocks between steps, and ends
/// at the first non-step content after its last step, or where a step with a
/// first ordinal from the sequence's own pattern opens a new one. A first
/// ordinal that directly follows the previous step's letter continues the
/// list.
pub fn detect_step_sequences(
    lines: &[String],
    patterns: &[Regex],
    callouts: &[CompiledCallout],
) -> Vec<StepSequenceSpan> {
    let n = lines.len();
    let steps: Vec<Option<(usize, Option<String>)>> =
        lines.iter().map(|l| step_match(l, patterns)).collect();
    let is_callout = |i: usize| callout_at(&lines[i], callouts).is_some();
    // End of the body that starts at `from`: stops at a blank, step or callout line.
    let body_end = |from: usize| {
        let mut k = from;
        while k < n && !is_blank(lines, k) && steps[k].is_none() && !is_callout(k) {
            k += 1;
        }
        k
    };

    let mut spans = Vec::new();
    let mut i = 0;
    while i < n {
        let Some((first_pattern, _)) = &steps[i] else {
            i += 1;
            continue;
        };
        let start = i;
        let mut current = i;
        let end = loop {
            let k = body_end(current + 1);
            let mut next = k;
            loop {
                while next < n && is_blank(lines, next) {
                    next += 1;
                }
                if next < n && is_callout(next) {
                    next = body_end(next + 1);
                    continue;
                }
                break;
            }
            let previous = steps[current].as_ref().and_then(|(_, o)| o.as_deref());
            let continues = next < n
                && steps[next].as_ref().is_some_and(|(pattern, ordinal)| {
                    let restarts = pattern == first_pattern
                        && ordinal.as_deref().is_some_and(|o| {
                            FIRST_ORDINALS.contains(&o) && !is_successor(previous, o)
                        });
                    !restarts
                });
            if continues {
                current = next;
                continue;
            }
            // A trailing `Label:` line introduces what follows, not this step.
            let mut end = k;
            while end > current + 1 && lines[end - 1].trim_end().ends_with(':') {
                end -= 1;
            }
            break end;
        };
        spans.push(StepSequenceSpan {
            start_line: start,
            end_line: end,
        });
        i = end.max(start + 1);
    }
    spans
}

// ── Safety callouts ─────────────────────────────────────────────────

/// A block callout runs until a blank line, a step line or another callout.
pub fn detect_safety_callouts(
    lines: &[String],
    callouts: &[CompiledCallout],
    step_patterns: &[Regex],
) -> Vec<SafetyCalloutSpan> {
    let n = lines.len();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < n {
        let Some(which) = callout_at(&lines[i], callouts) else {
            i += 1;
            continue;
        };
        let callout = &callouts[which];
        let mut end = i + 1;
        if callout.style == CalloutStyle::Block {
            while end < n
                && !is_blank(lines, end)
                && step_match(&lines[end], step_patterns).is_none()
                && callout_at(&lines[end], callouts).is_none()
            {
                end += 1;
            }
        }
        let text = lines[i..end]
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(" ");
        spans.push(SafetyCalloutSpan {
            level: callout.level,
            text,
            line_range: Span::new(i, end),
        });
        i = end;
    }
    spans
}

// ── Tables ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableLine {
    /// Dot leaders or at least two column gaps.
    Row,
    /// `Name: value` with a digit in the value.
    KeyValue,
    /// Short line ending with `:`.
    Label,
    /// Short all-caps line.
    Title,
    Other,
    Blank,
}

/// Runs of two or more spaces (or a tab) between cells. A run after sentence
/// punctuation is a sentence break, not a column.
fn column_gaps(line: &str) -> usize {
    let mut gaps = 0;
    let mut spaces = 0;
    let mut after_sentence = false;
    for c in line.chars() {
        match c {
            '\t' => spaces += 2,
            ' ' => spaces += 1,
            _ => {
                if spaces >= 2 && !after_sentence {
                    gaps += 1;
                }
                spaces = 0;
                after_sentence = matches!(c, '.' | '!' | '?');
            }
        }
    }
    gaps
}

fn classify(line: &str) -> TableLine {
    let line = line.trim();
    if line.is_empty() {
        return TableLine::Blank;
    }
    if line.contains("....") || line.contains("\u{2026}\u{2026}") || column_gaps(line) >= 2 {
        return TableLine::Row;
    }
    let words = manual_core::count_words(line);
    if line.ends_with(':') && words <= 6 {
        return TableLine::Label;
    }
    if let Some((key, value)) = line.split_once(':') {
        if !key.trim().is_empty() && key.len() <= 60 && value.chars().any(|c| c.is_ascii_digit()) {
            return TableLine::KeyValue;
        }
    }
    let has_letters = line.chars().any(char::is_alphabetic);
    if has_letters && !line.chars().any(char::is_lowercase) && words <= 4 {
        return TableLine::Title;
    }
    TableLine::Other
}

/// Maximal runs of row/key-value/label lines that contain at least one row,
/// plus a directly preceding title line.
pub fn detect_tables(lines: &[String]) -> Vec<TableSpan> {
    let kinds: Vec<TableLine> = lines.iter().map(|l| classify(l)).collect();
    let in_table = |k: TableLine| matches!(k, TableLine::Row | TableLine::KeyValue | TableLine::Label);

    let mut spans = Vec::new();
    let mut i = 0;
    while i < kinds.len() {
        if !in_table(kinds[i]) {
            i += 1;
            continue;
        }
        let mut run_end = i;
        while run_end < kinds.len() && in_table(kinds[run_end]) {
            run_end += 1;
        }
        if kinds[i..run_end].contains(&TableLine::Row) {
            let start = if i > 0 && kinds[i - 1] == TableLine::Title { i - 1 } else { i };
            let mut end = run_end;
            while kinds[end - 1] == TableLine::Label {
                end -= 1;
            }
            spans.push(TableSpan {
                start_line: start,
                end_line: end,
            });
        }
        i = run_end;
    }
    spans
}

// ── Figures ─────────────────────────────────────────────────────────

pub fn detect_figure_references(lines: &[String], pattern: Option<&Regex>) -> Vec<FigureReference> {
    let Some(re) = pattern else {
        return Vec::new();
    };
    lines
        .iter()
        .enumerate()
        .flat_map(|(line, text)| {
            re.captures_iter(text).filter_map(move |caps| {
                caps.get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| FigureReference {
                        id: m.as_str().trim().to_string(),
                        line,
                    })
            })
        })
        .collect()
}

// ── Safety attachments ──────────────────────────────────────────────

/// Extend each callout over the procedure it governs: the step sequence,
/// table or paragraph that follows after blank lines. Chained callouts are
/// followed through. A callout with nothing after it has no attachment.
pub fn safety_attachments(
    lines: &[String],
    callouts: &[SafetyCalloutSpan],
    steps: &[StepSequenceSpan],
    tables: &[TableSpan],
) -> Vec<Span> {
    let n = lines.len();
    callouts
        .iter()
        .filter_map(|callout| {
            let mut end = callout.line_range.end;
            let mut governs = false;
            loop {
                let mut next = end;
                while next < n && is_blank(lines, next) {
                    next += 1;
                }
                if next >= n {
                    break;
                }
                if let Some(chained) = callouts.iter().find(|c| c.line_range.start == next) {
                    end = chained.line_range.end;
                    continue;
                }
                end = if let Some(s) = steps.iter().find(|s| s.start_line == next) {
                    s.end_line
                } else if let Some(t) = tables.iter().find(|t| t.start_line == next) {
                    t.end_line
                } else {
                    let mut p = next;
                    while p < n && !is_blank(lines, p) {
                        p += 1;
                    }
                    p
                };
                governs = true;
                break;
            }
            governs.then(|| Span::new(callout.line_range.start, end))
        })
        .collect()
}

/// Run every detector over one entry's lines.
pub fn detect_spans(lines: &[String], profile: &CompiledProfile) -> DetectedSpans {
    let steps = detect_step_sequences(lines, &profile.step_patterns, &profile.safety_callouts);
    let callouts = detect_safety_callouts(lines, &profile.safety_callouts, &profile.step_patterns);
    let tables = detect_tables(lines);
    let figures = detect_figure_references(lines, profile.figure_reference.as_ref());
    let safety_attachments = safety_attachments(lines, &callouts, &steps, &tables);
    DetectedSpans {
        steps,
        callouts,
        tables,
        figures,
        safety_attachments,
    }
}
